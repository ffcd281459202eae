//! Closed category code tables: display labels and color tokens.
//!
//! Codes arrive as uppercase strings. Known codes map to an enum variant with
//! an exhaustive label (and, for lead sources, a color); unknown codes fall
//! back to the raw code and index-based palette cycling.

/// Chart palette: the five theme chart tokens followed by grays.
pub const PALETTE: [&str; 20] = [
  "var(--chart-1)",
  "var(--chart-2)",
  "var(--chart-3)",
  "var(--chart-4)",
  "var(--chart-5)",
  "hsl(0, 0%, 20%)",
  "hsl(0, 0%, 30%)",
  "hsl(0, 0%, 40%)",
  "hsl(0, 0%, 50%)",
  "hsl(0, 0%, 60%)",
  "hsl(0, 0%, 70%)",
  "hsl(0, 0%, 75%)",
  "hsl(0, 0%, 80%)",
  "hsl(0, 0%, 85%)",
  "hsl(0, 0%, 25%)",
  "hsl(0, 0%, 35%)",
  "hsl(0, 0%, 45%)",
  "hsl(0, 0%, 55%)",
  "hsl(0, 0%, 65%)",
  "hsl(0, 0%, 15%)",
];

/// Palette color for position `index`, cycling.
pub fn palette_at(index: usize) -> &'static str {
  PALETTE[index % PALETTE.len()]
}

/// A closed set of category codes with display metadata.
pub trait Category: Sized + Copy {
  fn from_code(code: &str) -> Option<Self>;

  fn label(self) -> &'static str;

  /// Fixed color for this category, if the table assigns one.
  fn color(self) -> Option<&'static str>;
}

/// Display label for `code`, echoing the code when unknown.
pub fn label_for<C: Category>(code: &str) -> String {
  C::from_code(code)
    .map(|category| category.label().to_string())
    .unwrap_or_else(|| code.to_string())
}

/// Color for `code` at series position `index`.
pub fn color_for<C: Category>(code: &str, index: usize) -> &'static str {
  C::from_code(code)
    .and_then(Category::color)
    .unwrap_or_else(|| palette_at(index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadSource {
  Event,
  Referral,
  Conference,
  OrganicSearch,
  SocialMedia,
  Other,
  Website,
  Cold,
}

impl Category for LeadSource {
  fn from_code(code: &str) -> Option<Self> {
    Some(match code {
      "EVENT" => Self::Event,
      "REFERRAL" => Self::Referral,
      "CONFERENCE" => Self::Conference,
      "ORGANIC_SEARCH" => Self::OrganicSearch,
      "SOCIAL_MEDIA" => Self::SocialMedia,
      "OTHER" => Self::Other,
      "WEBSITE" => Self::Website,
      "COLD" => Self::Cold,
      _ => return None,
    })
  }

  fn label(self) -> &'static str {
    match self {
      Self::Event => "Event",
      Self::Referral => "Referral",
      Self::Conference => "Conference",
      Self::OrganicSearch => "Organic Search",
      Self::SocialMedia => "Social Media",
      Self::Other => "Other",
      Self::Website => "Website",
      Self::Cold => "Cold Outreach",
    }
  }

  fn color(self) -> Option<&'static str> {
    Some(match self {
      Self::Event | Self::Website => PALETTE[0],
      Self::Referral | Self::Cold => PALETTE[1],
      Self::Conference => PALETTE[2],
      Self::OrganicSearch => PALETTE[3],
      Self::SocialMedia => PALETTE[4],
      Self::Other => PALETTE[5],
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommercialSector {
  Retail,
  ProfessionalServices,
  MediaAndEntertainment,
  Healthcare,
  Events,
  Technology,
  Education,
  Tourism,
  FoodAndBeverage,
  FinancialServices,
  Logistics,
  Design,
  Construction,
  RealEstate,
  NonProfit,
  Security,
  Energy,
  Transportation,
  Agriculture,
}

impl Category for CommercialSector {
  fn from_code(code: &str) -> Option<Self> {
    Some(match code {
      "RETAIL" => Self::Retail,
      "PROFESSIONAL_SERVICES" => Self::ProfessionalServices,
      "MEDIA_AND_ENTERTAINMENT" => Self::MediaAndEntertainment,
      "HEALTHCARE" => Self::Healthcare,
      "EVENTS" => Self::Events,
      "TECHNOLOGY" => Self::Technology,
      "EDUCATION" => Self::Education,
      "TOURISM" => Self::Tourism,
      "FOOD_AND_BEVERAGE" => Self::FoodAndBeverage,
      "FINANCIAL_SERVICES" => Self::FinancialServices,
      "LOGISTICS" => Self::Logistics,
      "DESIGN" => Self::Design,
      "CONSTRUCTION" => Self::Construction,
      "REAL_ESTATE" => Self::RealEstate,
      "NON_PROFIT" => Self::NonProfit,
      "SECURITY" => Self::Security,
      "ENERGY" => Self::Energy,
      "TRANSPORTATION" => Self::Transportation,
      "AGRICULTURE" => Self::Agriculture,
      _ => return None,
    })
  }

  fn label(self) -> &'static str {
    match self {
      Self::Retail => "Retail",
      Self::ProfessionalServices => "Professional Services",
      Self::MediaAndEntertainment => "Media & Entertainment",
      Self::Healthcare => "Healthcare",
      Self::Events => "Events",
      Self::Technology => "Technology",
      Self::Education => "Education",
      Self::Tourism => "Tourism",
      Self::FoodAndBeverage => "Food & Beverage",
      Self::FinancialServices => "Financial Services",
      Self::Logistics => "Logistics",
      Self::Design => "Design",
      Self::Construction => "Construction",
      Self::RealEstate => "Real Estate",
      Self::NonProfit => "Non Profit",
      Self::Security => "Security",
      Self::Energy => "Energy",
      Self::Transportation => "Transportation",
      Self::Agriculture => "Agriculture",
    }
  }

  /// Sectors are colored by series position only.
  fn color(self) -> Option<&'static str> {
    None
  }
}
