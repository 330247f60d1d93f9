use serde::{Deserialize, Serialize};

/// How a metric is laid out against income when building a template path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Interpolate in `(ln income, ln value)`; metric values must be positive.
    #[serde(rename = "log-log")]
    LogLog,
    /// Interpolate in `(ln income, value)`; metric values may be zero.
    #[serde(rename = "log-x")]
    LogX,
}

impl Transform {
    /// Whether a metric value must be strictly positive to be usable.
    pub fn requires_positive_metric(&self) -> bool {
        matches!(self, Transform::LogLog)
    }

    /// Whether `value` is usable as a metric observation or anchor under this transform.
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && (!self.requires_positive_metric() || value > 0.0)
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::LogLog => write!(f, "log-log"),
            Transform::LogX => write!(f, "log-x"),
        }
    }
}

/// How a template ratio or difference is combined with an entity's own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    #[serde(alias = "multiplicative")]
    Multiply,
    #[serde(alias = "additive")]
    Add,
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Composition::Multiply => write!(f, "multiply"),
            Composition::Add => write!(f, "add"),
        }
    }
}

/// Conversion from a per-capita or percentage value into an absolute total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsRule {
    /// kg oil equivalent per capita -> tonnes oil equivalent
    EnergyToe,
    /// kWh per capita -> terawatt-hours
    ElectricityTwh,
    /// tonnes CO2 per capita -> megatonnes CO2
    EmissionsMt,
    /// % of population -> persons
    PercentOfPopulation,
    /// % of GDP -> currency total
    PercentOfGdp,
}

impl TotalsRule {
    /// Conversion rule for the built-in indicator codes.
    pub fn for_code(code: &str) -> Option<Self> {
        match code {
            ENERGY_USE_PC => Some(TotalsRule::EnergyToe),
            ELECTRICITY_USE_PC => Some(TotalsRule::ElectricityTwh),
            CO2_EMISSIONS_PC => Some(TotalsRule::EmissionsMt),
            URBAN_POPULATION_PCT | ELECTRICITY_ACCESS_PCT => {
                Some(TotalsRule::PercentOfPopulation)
            }
            CAPITAL_FORMATION_PCT_GDP | MANUFACTURING_PCT_GDP => Some(TotalsRule::PercentOfGdp),
            _ => None,
        }
    }

    /// Unit label of the converted total.
    pub fn unit(&self) -> &'static str {
        match self {
            TotalsRule::EnergyToe => "toe",
            TotalsRule::ElectricityTwh => "TWh",
            TotalsRule::EmissionsMt => "Mt CO2",
            TotalsRule::PercentOfPopulation => "persons",
            TotalsRule::PercentOfGdp => "USD",
        }
    }
}

pub const ENERGY_USE_PC: &str = "EG.USE.PCAP.KG.OE";
pub const ELECTRICITY_USE_PC: &str = "EG.USE.ELEC.KH.PC";
pub const CO2_EMISSIONS_PC: &str = "EN.ATM.CO2E.PC";
pub const URBAN_POPULATION_PCT: &str = "SP.URB.TOTL.IN.ZS";
pub const ELECTRICITY_ACCESS_PCT: &str = "EG.ELC.ACCS.ZS";
pub const CAPITAL_FORMATION_PCT_GDP: &str = "NE.GDI.TOTL.ZS";
pub const MANUFACTURING_PCT_GDP: &str = "NV.IND.MANF.ZS";

/// A metric whose level is projected along a donor template path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Indicator code (e.g. "EG.USE.ELEC.KH.PC")
    pub code: String,
    /// Human-readable label
    #[serde(default)]
    pub name: String,
    pub transform: Transform,
    pub composition: Composition,
    /// Optional `[min, max]` range the final estimate is clamped into
    #[serde(default)]
    pub clamp_range: Option<[f64; 2]>,
    /// Totals conversion; defaults to the rule for the built-in code, if any
    #[serde(default)]
    pub totals: Option<TotalsRule>,
}

impl MetricDefinition {
    pub fn new(code: &str, name: &str, transform: Transform, composition: Composition) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            transform,
            composition,
            clamp_range: None,
            totals: TotalsRule::for_code(code),
        }
    }

    pub fn with_clamp(mut self, min: f64, max: f64) -> Self {
        self.clamp_range = Some([min, max]);
        self
    }

    /// Totals rule, falling back to the built-in table when not set explicitly.
    pub fn totals_rule(&self) -> Option<TotalsRule> {
        self.totals.or_else(|| TotalsRule::for_code(&self.code))
    }

    /// Label for display: the name when present, else the code.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }

    /// The built-in metric catalog.
    pub fn builtin() -> Vec<MetricDefinition> {
        use Composition::*;
        use Transform::*;
        vec![
            MetricDefinition::new(ENERGY_USE_PC, "Energy use per capita (kg oe)", LogLog, Multiply),
            MetricDefinition::new(
                ELECTRICITY_USE_PC,
                "Electricity use per capita (kWh)",
                LogLog,
                Multiply,
            ),
            MetricDefinition::new(CO2_EMISSIONS_PC, "CO2 emissions per capita (t)", LogLog, Multiply),
            MetricDefinition::new(URBAN_POPULATION_PCT, "Urban population (%)", LogX, Add)
                .with_clamp(0.0, 100.0),
            MetricDefinition::new(ELECTRICITY_ACCESS_PCT, "Access to electricity (%)", LogX, Add)
                .with_clamp(0.0, 100.0),
            MetricDefinition::new(
                CAPITAL_FORMATION_PCT_GDP,
                "Gross capital formation (% GDP)",
                LogX,
                Add,
            )
            .with_clamp(0.0, 100.0),
            MetricDefinition::new(MANUFACTURING_PCT_GDP, "Manufacturing (% GDP)", LogX, Add)
                .with_clamp(0.0, 100.0),
        ]
    }
}
