use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;

/// Every customer attribute the pipeline accepts, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    City,
    Gender,
    SeniorCitizen,
    Partner,
    Dependents,
    Tenure,
    PhoneService,
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
    Contract,
    PaperlessBilling,
    PaymentMethod,
    MonthlyCharges,
    TotalCharges,
}

impl Attribute {
    pub const ALL: [Attribute; 20] = [
        Attribute::City,
        Attribute::Gender,
        Attribute::SeniorCitizen,
        Attribute::Partner,
        Attribute::Dependents,
        Attribute::Tenure,
        Attribute::PhoneService,
        Attribute::MultipleLines,
        Attribute::InternetService,
        Attribute::OnlineSecurity,
        Attribute::OnlineBackup,
        Attribute::DeviceProtection,
        Attribute::TechSupport,
        Attribute::StreamingTv,
        Attribute::StreamingMovies,
        Attribute::Contract,
        Attribute::PaperlessBilling,
        Attribute::PaymentMethod,
        Attribute::MonthlyCharges,
        Attribute::TotalCharges,
    ];

    /// The attribute's key in raw input maps and the prefix of its trained columns.
    pub fn name(&self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Gender => "Gender",
            Self::SeniorCitizen => "Senior_Citizen",
            Self::Partner => "Partner",
            Self::Dependents => "Dependents",
            Self::Tenure => "Tenure",
            Self::PhoneService => "Phone_Service",
            Self::MultipleLines => "Multiple_Lines",
            Self::InternetService => "Internet_Service",
            Self::OnlineSecurity => "Online_Security",
            Self::OnlineBackup => "Online_Backup",
            Self::DeviceProtection => "Device_Protection",
            Self::TechSupport => "Tech_Support",
            Self::StreamingTv => "Streaming_TV",
            Self::StreamingMovies => "Streaming_Movies",
            Self::Contract => "Contract",
            Self::PaperlessBilling => "Paperless_Billing",
            Self::PaymentMethod => "Payment_Method",
            Self::MonthlyCharges => "Monthly_Charges",
            Self::TotalCharges => "Total_Charges",
        }
    }

    pub fn from_name(name: &str) -> Option<Attribute> {
        ATTRIBUTE_INDEX.get(name).copied()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value domain of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeDomain {
    /// Closed enumeration of accepted values.
    Categorical { options: &'static [&'static str] },
    /// Inclusive numeric bounds with the granularity the input form offers.
    Numeric { min: f64, max: f64, step: f64, default: f64 },
}

impl AttributeDomain {
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical { .. })
    }

    pub fn contains_option(&self, value: &str) -> bool {
        match self {
            Self::Categorical { options } => options.contains(&value),
            Self::Numeric { .. } => false,
        }
    }
}

/// How an attribute turns into trained columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One indicator column per value, named `{attribute}_{value}`.
    OneHot,
    /// A single `Yes`/`No` column mapped to 1.0/0.0.
    Binary,
    /// Numeric value copied as is.
    PassThrough,
}

/// Form sections, in the order the input form presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Demographics,
    AccountBilling,
    Services,
    Location,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Demographics,
        Section::AccountBilling,
        Section::Services,
        Section::Location,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Demographics => "Demographics",
            Self::AccountBilling => "Account & Billing",
            Self::Services => "Services",
            Self::Location => "Location",
        }
    }
}

/// Everything the pipeline knows about one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub attribute: Attribute,
    /// Human readable label shown next to the input control
    pub label: &'static str,
    pub section: Section,
    pub encoding: Encoding,
    pub domain: AttributeDomain,
}

impl AttributeSpec {
    pub fn name(&self) -> &'static str {
        self.attribute.name()
    }
}

pub const CITIES: [&str; 41] = [
    "Acampo", "Acton", "Adelanto", "Adin", "Agoura_Hills", "Alameda", "Alamo",
    "Alderpoint", "Aliso_Viejo", "Altadena", "Amador_City", "Amboy", "Amherst",
    "Amity", "Amposta", "Andover", "Angel_Fire", "Angleton", "Angwin", "Annapolis",
    "Annville", "Anselmo", "Anthony", "Antioch", "Antler", "Anton", "Antonia",
    "Antwine", "Antwerp", "Anvil", "Apalachia", "Apex", "Apline", "Aplington",
    "Apodaca", "Apollinaire", "Apolo", "Apoloosa", "Apoyo", "Apoyecan", "Appalachian",
];

const YES_NO: &[&str] = &["Yes", "No"];
const NO_YES: &[&str] = &["No", "Yes"];
const INTERNET_ADDON: &[&str] = &["Yes", "No", "No_internet_service"];

/// Order in which the input form, and therefore the export row, lists attributes.
const FORM_ORDER: [Attribute; 20] = [
    Attribute::Gender,
    Attribute::SeniorCitizen,
    Attribute::Partner,
    Attribute::Dependents,
    Attribute::Tenure,
    Attribute::Contract,
    Attribute::PaymentMethod,
    Attribute::PaperlessBilling,
    Attribute::MonthlyCharges,
    Attribute::TotalCharges,
    Attribute::PhoneService,
    Attribute::MultipleLines,
    Attribute::InternetService,
    Attribute::OnlineSecurity,
    Attribute::OnlineBackup,
    Attribute::DeviceProtection,
    Attribute::TechSupport,
    Attribute::StreamingTv,
    Attribute::StreamingMovies,
    Attribute::City,
];

fn declare(attribute: Attribute) -> AttributeSpec {
    use Attribute::*;

    let categorical = |options: &'static [&'static str]| AttributeDomain::Categorical { options };
    let (label, section, encoding, domain) = match attribute {
        City => ("City", Section::Location, Encoding::OneHot, categorical(&CITIES)),
        Gender => ("Gender", Section::Demographics, Encoding::OneHot, categorical(&["Male", "Female"])),
        SeniorCitizen => ("Senior Citizen", Section::Demographics, Encoding::OneHot, categorical(NO_YES)),
        Partner => ("Partner", Section::Demographics, Encoding::OneHot, categorical(YES_NO)),
        Dependents => ("Dependents", Section::Demographics, Encoding::OneHot, categorical(YES_NO)),
        Tenure => (
            "Tenure (Months)",
            Section::AccountBilling,
            Encoding::PassThrough,
            AttributeDomain::Numeric { min: 0.0, max: 72.0, step: 1.0, default: 0.0 },
        ),
        PhoneService => ("Phone Service", Section::Services, Encoding::Binary, categorical(YES_NO)),
        MultipleLines => (
            "Multiple Lines",
            Section::Services,
            Encoding::OneHot,
            categorical(&["Yes", "No", "No_phone_service"]),
        ),
        InternetService => (
            "Internet Service",
            Section::Services,
            Encoding::OneHot,
            categorical(&["DSL", "Fiber_optic", "No"]),
        ),
        OnlineSecurity => ("Online Security", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        OnlineBackup => ("Online Backup", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        DeviceProtection => ("Device Protection", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        TechSupport => ("Tech Support", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        StreamingTv => ("Streaming TV", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        StreamingMovies => ("Streaming Movies", Section::Services, Encoding::OneHot, categorical(INTERNET_ADDON)),
        Contract => (
            "Contract Type",
            Section::AccountBilling,
            Encoding::OneHot,
            categorical(&["Month-to-month", "One_year", "Two_year"]),
        ),
        PaperlessBilling => ("Paperless Billing", Section::AccountBilling, Encoding::OneHot, categorical(YES_NO)),
        PaymentMethod => (
            "Payment Method",
            Section::AccountBilling,
            Encoding::OneHot,
            categorical(&[
                "Electronic_check",
                "Mailed_check",
                "Bank_transfer_(automatic)",
                "Credit_card_(automatic)",
            ]),
        ),
        MonthlyCharges => (
            "Monthly Charges ($)",
            Section::AccountBilling,
            Encoding::PassThrough,
            AttributeDomain::Numeric { min: 0.0, max: 150.0, step: 0.01, default: 0.0 },
        ),
        TotalCharges => (
            "Total Charges ($)",
            Section::AccountBilling,
            Encoding::PassThrough,
            AttributeDomain::Numeric { min: 0.0, max: 10000.0, step: 0.01, default: 0.0 },
        ),
    };

    AttributeSpec { attribute, label, section, encoding, domain }
}

lazy_static! {
    static ref SCHEMA: AttributeSchema = AttributeSchema {
        attributes: Attribute::ALL.iter().map(|&a| declare(a)).collect(),
    };
    static ref ATTRIBUTE_INDEX: HashMap<&'static str, Attribute> =
        Attribute::ALL.iter().map(|&a| (a.name(), a)).collect();
}

/// The immutable attribute schema shared by validation, encoding and export.
#[derive(Debug)]
pub struct AttributeSchema {
    attributes: Vec<AttributeSpec>,
}

impl AttributeSchema {
    /// Returns the process-wide schema.
    pub fn global() -> &'static AttributeSchema {
        &SCHEMA
    }

    /// All attributes in declaration order.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn spec(&self, attribute: Attribute) -> &AttributeSpec {
        // `attributes` is built from `Attribute::ALL`, so the discriminant is the index.
        &self.attributes[attribute as usize]
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        Attribute::from_name(name).map(|a| self.spec(a))
    }

    pub fn numeric(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|s| !s.domain.is_categorical())
    }

    pub fn categorical(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|s| s.domain.is_categorical())
    }

    /// Attributes in the order the input form lists them.
    pub fn form_order(&self) -> impl Iterator<Item = &AttributeSpec> {
        FORM_ORDER.iter().map(move |&a| self.spec(a))
    }

    pub fn section(&self, section: Section) -> impl Iterator<Item = &AttributeSpec> {
        self.form_order().filter(move |s| s.section == section)
    }

    /// Every column the encoder is able to produce, pass-through columns first,
    /// then indicator columns in declaration order.
    pub fn expanded_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.attributes.iter()
            .filter(|s| s.encoding != Encoding::OneHot)
            .map(|s| s.name().to_string())
            .collect();

        for spec in self.attributes.iter().filter(|s| s.encoding == Encoding::OneHot) {
            if let AttributeDomain::Categorical { options } = &spec.domain {
                columns.extend(options.iter().map(|value| one_hot_column(spec.attribute, value)));
            }
        }
        columns
    }
}

/// Name of the indicator column for `value` of `attribute`.
pub fn one_hot_column(attribute: Attribute, value: &str) -> String {
    format!("{}_{}", attribute.name(), value)
}

/// Looks up the domain of an attribute.
pub fn schema_for(attribute: Attribute) -> &'static AttributeDomain {
    &AttributeSchema::global().spec(attribute).domain
}
