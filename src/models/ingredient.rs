use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::constants::DEFAULT_STANDARD_DOSAGE_G_PER_TON;
use crate::error::FeedError;

/// Intrinsic nutrient fields carried by every ingredient.
///
/// Values are a percentage of the ingredient's own mass, except
/// `MetabolizableEnergy` (kcal/kg) and `Choline` (mg/kg).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Nutrient {
    CrudeProtein,
    MetabolizableEnergy,
    Calcium,
    AvailablePhosphorus,
    Sodium,
    Potassium,
    Chloride,
    Lysine,
    MethionineCystine,
    Threonine,
    Valine,
    Isoleucine,
    Leucine,
    Arginine,
    Tryptophan,
    Starch,
    CrudeFiber,
    NeutralDetergentFiber,
    AcidDetergentFiber,
    Ash,
    Choline,
}

impl Nutrient {
    pub const COUNT: usize = 21;

    /// Every nutrient in display order.
    pub const ALL: [Nutrient; Nutrient::COUNT] = [
        Nutrient::CrudeProtein,
        Nutrient::MetabolizableEnergy,
        Nutrient::Calcium,
        Nutrient::AvailablePhosphorus,
        Nutrient::Sodium,
        Nutrient::Potassium,
        Nutrient::Chloride,
        Nutrient::Lysine,
        Nutrient::MethionineCystine,
        Nutrient::Threonine,
        Nutrient::Valine,
        Nutrient::Isoleucine,
        Nutrient::Leucine,
        Nutrient::Arginine,
        Nutrient::Tryptophan,
        Nutrient::Starch,
        Nutrient::CrudeFiber,
        Nutrient::NeutralDetergentFiber,
        Nutrient::AcidDetergentFiber,
        Nutrient::Ash,
        Nutrient::Choline,
    ];

    /// Stable field name used in catalogs, matrices and analysis output.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::CrudeProtein => "CP_pct",
            Nutrient::MetabolizableEnergy => "ME_kcal_per_kg",
            Nutrient::Calcium => "Ca_pct",
            Nutrient::AvailablePhosphorus => "avP_pct",
            Nutrient::Sodium => "Na_pct",
            Nutrient::Potassium => "K_pct",
            Nutrient::Chloride => "Cl_pct",
            Nutrient::Lysine => "Lys_pct",
            Nutrient::MethionineCystine => "TSAA_pct",
            Nutrient::Threonine => "Thr_pct",
            Nutrient::Valine => "Val_pct",
            Nutrient::Isoleucine => "Ile_pct",
            Nutrient::Leucine => "Leu_pct",
            Nutrient::Arginine => "Arg_pct",
            Nutrient::Tryptophan => "Try_pct",
            Nutrient::Starch => "Starch_pct",
            Nutrient::CrudeFiber => "CF_pct",
            Nutrient::NeutralDetergentFiber => "NDF_pct",
            Nutrient::AcidDetergentFiber => "ADF_pct",
            Nutrient::Ash => "Ash_pct",
            Nutrient::Choline => "Choline_mg_per_kg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::CrudeProtein => "Crude Protein %",
            Nutrient::MetabolizableEnergy => "ME (kcal/kg)",
            Nutrient::Calcium => "Calcium %",
            Nutrient::AvailablePhosphorus => "Av. Phosphorus %",
            Nutrient::Sodium => "Sodium %",
            Nutrient::Potassium => "Potassium %",
            Nutrient::Chloride => "Chlorine %",
            Nutrient::Lysine => "Lysine %",
            Nutrient::MethionineCystine => "Met+Cys %",
            Nutrient::Threonine => "Threonine %",
            Nutrient::Valine => "Valine %",
            Nutrient::Isoleucine => "Isoleucine %",
            Nutrient::Leucine => "Leucine %",
            Nutrient::Arginine => "Arginine %",
            Nutrient::Tryptophan => "Tryptophan %",
            Nutrient::Starch => "Starch %",
            Nutrient::CrudeFiber => "Crude Fiber %",
            Nutrient::NeutralDetergentFiber => "NDF %",
            Nutrient::AcidDetergentFiber => "ADF %",
            Nutrient::Ash => "Ash %",
            Nutrient::Choline => "Choline (mg/kg)",
        }
    }

    /// Unit the value is stored in.
    pub fn base_unit(self) -> &'static str {
        match self {
            Nutrient::MetabolizableEnergy => "kcal/kg",
            Nutrient::Choline => "mg/kg",
            _ => "%",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Nutrient {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nutrient::ALL
            .into_iter()
            .find(|n| n.key() == s)
            .ok_or_else(|| FeedError::UnknownNutrient(s.to_string()))
    }
}

impl TryFrom<String> for Nutrient {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Nutrient> for &'static str {
    fn from(value: Nutrient) -> Self {
        value.key()
    }
}

/// One value per [`Nutrient`]; absent fields are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientValues([f64; Nutrient::COUNT]);

impl NutrientValues {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0[nutrient.index()] = value;
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.into_iter().map(|n| (n, self.get(n)))
    }

    /// True when every field is zero (binders, premix carriers, enzymes).
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl Serialize for NutrientValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Nutrient::COUNT))?;
        for (nutrient, value) in self.iter() {
            map.serialize_entry(nutrient.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NutrientValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValuesVisitor;

        impl<'de> Visitor<'de> for ValuesVisitor {
            type Value = NutrientValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of nutrient fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = NutrientValues::default();
                while let Some(key) = access.next_key::<String>()? {
                    // Fields outside the nutrient list (legacy columns) are ignored.
                    match key.parse::<Nutrient>() {
                        Ok(nutrient) => values.set(nutrient, access.next_value()?),
                        Err(_) => {
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(ValuesVisitor)
    }
}

/// Category tag as stored in catalogs.
///
/// Parsing ignores case and surrounding whitespace; a blank tag is `Other`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum IngredientCategory {
    Energy,
    Protein,
    AminoAcids,
    MineralSupplements,
    Medicated,
    #[default]
    Other,
    Enzymes,
}

impl IngredientCategory {
    pub const ALL: [IngredientCategory; 7] = [
        IngredientCategory::Energy,
        IngredientCategory::Protein,
        IngredientCategory::AminoAcids,
        IngredientCategory::MineralSupplements,
        IngredientCategory::Medicated,
        IngredientCategory::Other,
        IngredientCategory::Enzymes,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            IngredientCategory::Energy => "Energy Sources",
            IngredientCategory::Protein => "Protein Sources",
            IngredientCategory::AminoAcids => "Amino Acids",
            IngredientCategory::MineralSupplements => "Mineral Supplements",
            IngredientCategory::Medicated => "Medicated Additives",
            IngredientCategory::Other => "Other Additives",
            IngredientCategory::Enzymes => "Enzymes",
        }
    }

    /// Tag as written in catalog files.
    pub fn tag(self) -> &'static str {
        match self {
            IngredientCategory::Energy => "Energy",
            IngredientCategory::Protein => "Protein",
            IngredientCategory::AminoAcids => "AminoAcids",
            IngredientCategory::MineralSupplements => "MineralSupplements",
            IngredientCategory::Medicated => "Medicated",
            IngredientCategory::Other => "Other",
            IngredientCategory::Enzymes => "Enzymes",
        }
    }
}

impl FromStr for IngredientCategory {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            return Ok(IngredientCategory::Other);
        }
        IngredientCategory::ALL
            .into_iter()
            .find(|c| {
                c.tag().eq_ignore_ascii_case(tag) || c.display_name().eq_ignore_ascii_case(tag)
            })
            .ok_or_else(|| FeedError::InvalidInput(format!("unknown category '{}'", s)))
    }
}

impl TryFrom<String> for IngredientCategory {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IngredientCategory> for &'static str {
    fn from(value: IngredientCategory) -> Self {
        value.tag()
    }
}

/// Categories a nutrient-bearing (non-enzyme) ingredient can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedCategory {
    Energy,
    Protein,
    AminoAcids,
    MineralSupplements,
    Medicated,
    Other,
}

impl From<FeedCategory> for IngredientCategory {
    fn from(value: FeedCategory) -> Self {
        match value {
            FeedCategory::Energy => IngredientCategory::Energy,
            FeedCategory::Protein => IngredientCategory::Protein,
            FeedCategory::AminoAcids => IngredientCategory::AminoAcids,
            FeedCategory::MineralSupplements => IngredientCategory::MineralSupplements,
            FeedCategory::Medicated => IngredientCategory::Medicated,
            FeedCategory::Other => IngredientCategory::Other,
        }
    }
}

/// Dose-response data of an enzyme, measured at its standard dosage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnzymeProfile {
    /// Reference dosage in g/ton at which `matrix` was measured.
    pub standard_dosage_g_per_ton: Option<f64>,
    /// Absolute uplift per nutrient at the standard dosage.
    pub matrix: Option<BTreeMap<Nutrient, f64>>,
}

impl EnzymeProfile {
    /// Parse a standard dosage as typed by the user.
    ///
    /// Blank, unparsable or non-positive text falls back to 100 g/ton.
    pub fn parse_dosage(text: &str) -> f64 {
        match text.trim().parse::<f64>() {
            Ok(dosage) if dosage.is_finite() && dosage > 0.0 => dosage,
            _ => DEFAULT_STANDARD_DOSAGE_G_PER_TON,
        }
    }

    /// Build a profile from the dosage and matrix entries of the enzyme editor.
    ///
    /// Blank or unparsable matrix entries leave the nutrient out of the matrix.
    pub fn from_entries<'a, I>(dosage: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (Nutrient, &'a str)>,
    {
        let matrix = entries
            .into_iter()
            .filter_map(|(nutrient, text)| {
                let value = text.trim().parse::<f64>().ok()?;
                value.is_finite().then_some((nutrient, value))
            })
            .collect();

        Self {
            standard_dosage_g_per_ton: Some(Self::parse_dosage(dosage)),
            matrix: Some(matrix),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngredientKind {
    Feed(FeedCategory),
    Enzyme(EnzymeProfile),
}

impl IngredientKind {
    /// Kind for a catalog category. `profile` is kept only for enzymes.
    pub fn for_category(category: IngredientCategory, profile: EnzymeProfile) -> Self {
        match category {
            IngredientCategory::Energy => IngredientKind::Feed(FeedCategory::Energy),
            IngredientCategory::Protein => IngredientKind::Feed(FeedCategory::Protein),
            IngredientCategory::AminoAcids => IngredientKind::Feed(FeedCategory::AminoAcids),
            IngredientCategory::MineralSupplements => {
                IngredientKind::Feed(FeedCategory::MineralSupplements)
            }
            IngredientCategory::Medicated => IngredientKind::Feed(FeedCategory::Medicated),
            IngredientCategory::Other => IngredientKind::Feed(FeedCategory::Other),
            IngredientCategory::Enzymes => IngredientKind::Enzyme(profile),
        }
    }
}

/// A feed ingredient or enzyme with its inclusion rate in the mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IngredientRecord", into = "IngredientRecord")]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub kind: IngredientKind,
    /// Percentage of the feed's total mass.
    pub inclusion_pct: f64,
    pub nutrients: NutrientValues,
    /// Currency per ton.
    pub price_per_ton: f64,
}

impl Ingredient {
    pub fn feed(id: u64, name: impl Into<String>, category: FeedCategory) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind: IngredientKind::Feed(category),
            inclusion_pct: 0.0,
            nutrients: NutrientValues::default(),
            price_per_ton: 0.0,
        }
    }

    pub fn enzyme(
        id: u64,
        name: impl Into<String>,
        standard_dosage_g_per_ton: f64,
        matrix: BTreeMap<Nutrient, f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind: IngredientKind::Enzyme(EnzymeProfile {
                standard_dosage_g_per_ton: Some(standard_dosage_g_per_ton),
                matrix: Some(matrix),
            }),
            inclusion_pct: 0.0,
            nutrients: NutrientValues::default(),
            price_per_ton: 0.0,
        }
    }

    /// Empty ingredient for a category, as created by "add ingredient".
    ///
    /// New enzymes start at the default standard dosage with an empty matrix.
    pub fn blank(id: u64, category: IngredientCategory) -> Self {
        let profile = EnzymeProfile {
            standard_dosage_g_per_ton: Some(DEFAULT_STANDARD_DOSAGE_G_PER_TON),
            matrix: Some(BTreeMap::new()),
        };
        Self {
            id,
            name: "New Ingredient".to_string(),
            description: String::new(),
            kind: IngredientKind::for_category(category, profile),
            inclusion_pct: 0.0,
            nutrients: NutrientValues::default(),
            price_per_ton: 0.0,
        }
    }

    pub fn with_inclusion(mut self, inclusion_pct: f64) -> Self {
        self.inclusion_pct = inclusion_pct;
        self
    }

    pub fn with_price(mut self, price_per_ton: f64) -> Self {
        self.price_per_ton = price_per_ton;
        self
    }

    pub fn with_nutrient(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.nutrients.set(nutrient, value);
        self
    }

    pub fn category(&self) -> IngredientCategory {
        match &self.kind {
            IngredientKind::Feed(category) => (*category).into(),
            IngredientKind::Enzyme(_) => IngredientCategory::Enzymes,
        }
    }

    pub fn is_enzyme(&self) -> bool {
        matches!(self.kind, IngredientKind::Enzyme(_))
    }

    pub fn enzyme_profile(&self) -> Option<&EnzymeProfile> {
        match &self.kind {
            IngredientKind::Enzyme(profile) => Some(profile),
            IngredientKind::Feed(_) => None,
        }
    }

    /// Set one numeric field by its record key.
    ///
    /// Accepts `Price_USD_per_ton`, `Inclusion_pct`, any nutrient key and,
    /// for enzymes, `standard_dosage_g_per_ton`.
    pub fn set_field(&mut self, field: &str, value: f64) -> Result<(), FeedError> {
        let field = field.trim();
        if !value.is_finite() {
            return Err(FeedError::InvalidInput(format!(
                "{} must be a finite number",
                field
            )));
        }

        match field {
            "Price_USD_per_ton" | "price" => {
                if value < 0.0 {
                    return Err(FeedError::InvalidInput("Price cannot be negative".to_string()));
                }
                self.price_per_ton = value;
            }
            "Inclusion_pct" | "inclusion" => {
                if value < 0.0 {
                    return Err(FeedError::InvalidInput(
                        "Inclusion cannot be negative".to_string(),
                    ));
                }
                self.inclusion_pct = value;
            }
            "standard_dosage_g_per_ton" => match &mut self.kind {
                IngredientKind::Enzyme(profile) => {
                    profile.standard_dosage_g_per_ton = Some(value);
                }
                IngredientKind::Feed(_) => return Err(FeedError::UnknownField(field.to_string())),
            },
            other => {
                let nutrient = other
                    .parse::<Nutrient>()
                    .map_err(|_| FeedError::UnknownField(other.to_string()))?;
                self.nutrients.set(nutrient, value);
            }
        }
        Ok(())
    }

    /// Canonical key for name lookups.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Flat catalog record, the shape ingredient files are written in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IngredientRecord {
    id: u64,

    #[serde(rename = "Name")]
    name: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    category: IngredientCategory,

    #[serde(rename = "Inclusion_pct", default)]
    inclusion_pct: f64,

    #[serde(flatten)]
    nutrients: NutrientValues,

    #[serde(rename = "Price_USD_per_ton", default)]
    price_per_ton: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    standard_dosage_g_per_ton: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    matrix: Option<BTreeMap<Nutrient, f64>>,
}

impl From<IngredientRecord> for Ingredient {
    fn from(record: IngredientRecord) -> Self {
        let profile = EnzymeProfile {
            standard_dosage_g_per_ton: record.standard_dosage_g_per_ton,
            matrix: record.matrix,
        };
        let kind = IngredientKind::for_category(record.category, profile);

        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            kind,
            inclusion_pct: record.inclusion_pct,
            nutrients: record.nutrients,
            price_per_ton: record.price_per_ton,
        }
    }
}

impl From<Ingredient> for IngredientRecord {
    fn from(ingredient: Ingredient) -> Self {
        let category = ingredient.category();
        let (standard_dosage_g_per_ton, matrix) = match ingredient.kind {
            IngredientKind::Enzyme(profile) => (profile.standard_dosage_g_per_ton, profile.matrix),
            IngredientKind::Feed(_) => (None, None),
        };

        Self {
            id: ingredient.id,
            name: ingredient.name,
            description: ingredient.description,
            category,
            inclusion_pct: ingredient.inclusion_pct,
            nutrients: ingredient.nutrients,
            price_per_ton: ingredient.price_per_ton,
            standard_dosage_g_per_ton,
            matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_keys_roundtrip() {
        for nutrient in Nutrient::ALL {
            assert_eq!(nutrient.key().parse::<Nutrient>().unwrap(), nutrient);
        }
        assert!("phytateP_pct".parse::<Nutrient>().is_err());
    }

    #[test]
    fn test_missing_nutrients_default_to_zero() {
        let json = r#"{"id": 7, "Name": "Corn", "category": "Energy", "Inclusion_pct": 60, "CP_pct": 7.8}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();

        assert_eq!(ingredient.category(), IngredientCategory::Energy);
        assert!((ingredient.nutrients.get(Nutrient::CrudeProtein) - 7.8).abs() < 1e-12);
        assert_eq!(ingredient.nutrients.get(Nutrient::Choline), 0.0);
        assert_eq!(ingredient.price_per_ton, 0.0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"id": 1, "Name": "New", "category": "Other", "phytateP_pct": 0.2, "Ca_pct": 1.0}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert!((ingredient.nutrients.get(Nutrient::Calcium) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_enzyme_fields_only_on_enzymes() {
        let json = r#"{"id": 2, "Name": "Odd", "category": "Protein", "standard_dosage_g_per_ton": 100, "matrix": {"CP_pct": 1}}"#;
        let feed: Ingredient = serde_json::from_str(json).unwrap();
        assert!(feed.enzyme_profile().is_none());

        let json = r#"{"id": 3, "Name": "Phytase", "category": "Enzymes", "standard_dosage_g_per_ton": 100, "matrix": {"avP_pct": 0.12}}"#;
        let enzyme: Ingredient = serde_json::from_str(json).unwrap();
        let profile = enzyme.enzyme_profile().unwrap();
        assert_eq!(profile.standard_dosage_g_per_ton, Some(100.0));
        assert_eq!(
            profile.matrix.as_ref().unwrap().get(&Nutrient::AvailablePhosphorus),
            Some(&0.12)
        );
    }

    #[test]
    fn test_category_parsing_is_lenient() {
        let json = r#"{"id": 5, "Name": "Barley", "category": " energy "}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.category(), IngredientCategory::Energy);

        let json = r#"{"id": 6, "Name": "Binder", "category": ""}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.category(), IngredientCategory::Other);

        let json = r#"{"id": 7, "Name": "Phytase", "category": "ENZYMES", "standard_dosage_g_per_ton": 100}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert!(ingredient.is_enzyme());

        let json = r#"{"id": 8, "Name": "Mystery", "category": "Gravel"}"#;
        assert!(serde_json::from_str::<Ingredient>(json).is_err());
    }

    #[test]
    fn test_enzyme_entries_drop_blanks_and_default_dosage() {
        let profile = EnzymeProfile::from_entries(
            "-5",
            [
                (Nutrient::AvailablePhosphorus, "0.15"),
                (Nutrient::CrudeProtein, ""),
                (Nutrient::MetabolizableEnergy, "abc"),
                (Nutrient::Calcium, " 0.1 "),
            ],
        );
        assert_eq!(profile.standard_dosage_g_per_ton, Some(100.0));
        let matrix = profile.matrix.unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[&Nutrient::AvailablePhosphorus], 0.15);
        assert_eq!(matrix[&Nutrient::Calcium], 0.1);

        assert_eq!(EnzymeProfile::parse_dosage("250"), 250.0);
        assert_eq!(EnzymeProfile::parse_dosage(""), 100.0);
        assert_eq!(EnzymeProfile::parse_dosage("0"), 100.0);
        assert_eq!(EnzymeProfile::parse_dosage("NaN"), 100.0);
    }

    #[test]
    fn test_blank_ingredient_per_category() {
        let feed = Ingredient::blank(9, IngredientCategory::default());
        assert_eq!(feed.category(), IngredientCategory::Other);
        assert!(feed.nutrients.is_zero());

        let enzyme = Ingredient::blank(10, IngredientCategory::Enzymes);
        let profile = enzyme.enzyme_profile().unwrap();
        assert_eq!(profile.standard_dosage_g_per_ton, Some(100.0));
        assert!(profile.matrix.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_set_field() {
        let mut corn = Ingredient::feed(1, "Corn", FeedCategory::Energy);
        corn.set_field("Price_USD_per_ton", 310.0).unwrap();
        corn.set_field("CP_pct", 8.1).unwrap();
        corn.set_field("Inclusion_pct", 55.0).unwrap();

        assert_eq!(corn.price_per_ton, 310.0);
        assert_eq!(corn.nutrients.get(Nutrient::CrudeProtein), 8.1);
        assert_eq!(corn.inclusion_pct, 55.0);

        assert!(matches!(
            corn.set_field("phytateP_pct", 0.2),
            Err(FeedError::UnknownField(_))
        ));
        assert!(matches!(
            corn.set_field("standard_dosage_g_per_ton", 50.0),
            Err(FeedError::UnknownField(_))
        ));
        assert!(corn.set_field("price", -1.0).is_err());
        assert!(corn.set_field("CP_pct", f64::INFINITY).is_err());

        let mut phytase = Ingredient::blank(2, IngredientCategory::Enzymes);
        phytase.set_field("standard_dosage_g_per_ton", 50.0).unwrap();
        assert_eq!(phytase.enzyme_profile().unwrap().standard_dosage_g_per_ton, Some(50.0));
    }

    #[test]
    fn test_serialized_record_is_flat() {
        let ingredient = Ingredient::feed(4, "Limestone", FeedCategory::MineralSupplements)
            .with_inclusion(1.5)
            .with_nutrient(Nutrient::Calcium, 36.0);
        let value = serde_json::to_value(&ingredient).unwrap();

        assert_eq!(value["Name"], "Limestone");
        assert_eq!(value["category"], "MineralSupplements");
        assert_eq!(value["Ca_pct"], 36.0);
        assert!(value.get("matrix").is_none());

        let back: Ingredient = serde_json::from_value(value).unwrap();
        assert_eq!(back, ingredient);
    }
}
