//! Category registry and Kakebo classification.
//!
//! Every transaction carries one [`Category`]. Income categories stand on
//! their own; expense categories fall into exactly one of the four Kakebo
//! buckets ([`KakeboCategory`]). The tables here are static: nothing in this
//! module touches the database.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Direction of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// The four Kakebo expense buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KakeboCategory {
    Survival,
    Optional,
    Culture,
    Unexpected,
}

impl KakeboCategory {
    pub const ALL: [KakeboCategory; 4] = [
        Self::Survival,
        Self::Optional,
        Self::Culture,
        Self::Unexpected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Survival => "survival",
            Self::Optional => "optional",
            Self::Culture => "culture",
            Self::Unexpected => "unexpected",
        }
    }

    pub fn display_name(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Es, Self::Survival) => "Supervivencia",
            (Locale::Es, Self::Optional) => "Opcional",
            (Locale::Es, Self::Culture) => "Cultura",
            (Locale::Es, Self::Unexpected) => "Extra",
            (Locale::En, Self::Survival) => "Survival",
            (Locale::En, Self::Optional) => "Optional",
            (Locale::En, Self::Culture) => "Culture",
            (Locale::En, Self::Unexpected) => "Unexpected",
        }
    }
}

impl fmt::Display for KakeboCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for KakeboCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == code)
            .ok_or_else(|| EngineError::InvalidArgument(format!("invalid bucket: {value}")))
    }
}

/// Language used for user-facing names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl TryFrom<&str> for Locale {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(EngineError::InvalidArgument(format!(
                "unsupported locale: {other}"
            ))),
        }
    }
}

/// Closed set of transaction categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Income
    Salary,
    Investment,
    Freelance,
    Business,
    Gifts,
    // Survival
    Housing,
    Food,
    Transportation,
    Utilities,
    Healthcare,
    Insurance,
    // Optional
    Entertainment,
    Dining,
    Shopping,
    Hobbies,
    Travel,
    Sports,
    // Culture
    Books,
    Education,
    Courses,
    Subscriptions,
    // Unexpected
    Emergency,
    Repairs,
    Medical,
    Legal,
    Other,
}

impl Category {
    pub const ALL: [Category; 26] = [
        Self::Salary,
        Self::Investment,
        Self::Freelance,
        Self::Business,
        Self::Gifts,
        Self::Housing,
        Self::Food,
        Self::Transportation,
        Self::Utilities,
        Self::Healthcare,
        Self::Insurance,
        Self::Entertainment,
        Self::Dining,
        Self::Shopping,
        Self::Hobbies,
        Self::Travel,
        Self::Sports,
        Self::Books,
        Self::Education,
        Self::Courses,
        Self::Subscriptions,
        Self::Emergency,
        Self::Repairs,
        Self::Medical,
        Self::Legal,
        Self::Other,
    ];

    /// Stable code used for persistence and command-line parsing.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Investment => "investment",
            Self::Freelance => "freelance",
            Self::Business => "business",
            Self::Gifts => "gifts",
            Self::Housing => "housing",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Insurance => "insurance",
            Self::Entertainment => "entertainment",
            Self::Dining => "dining",
            Self::Shopping => "shopping",
            Self::Hobbies => "hobbies",
            Self::Travel => "travel",
            Self::Sports => "sports",
            Self::Books => "books",
            Self::Education => "education",
            Self::Courses => "courses",
            Self::Subscriptions => "subscriptions",
            Self::Emergency => "emergency",
            Self::Repairs => "repairs",
            Self::Medical => "medical",
            Self::Legal => "legal",
            Self::Other => "other",
        }
    }

    pub fn is_income(self) -> bool {
        matches!(
            self,
            Self::Salary | Self::Investment | Self::Freelance | Self::Business | Self::Gifts
        )
    }

    /// Kakebo bucket of an expense category.
    ///
    /// Income categories have no bucket and yield
    /// [`EngineError::InvalidArgument`].
    pub fn bucket(self) -> ResultEngine<KakeboCategory> {
        let bucket = match self {
            Self::Housing
            | Self::Food
            | Self::Transportation
            | Self::Utilities
            | Self::Healthcare
            | Self::Insurance => KakeboCategory::Survival,
            Self::Entertainment
            | Self::Dining
            | Self::Shopping
            | Self::Hobbies
            | Self::Travel
            | Self::Sports => KakeboCategory::Optional,
            Self::Books | Self::Education | Self::Courses | Self::Subscriptions => {
                KakeboCategory::Culture
            }
            Self::Emergency | Self::Repairs | Self::Medical | Self::Legal | Self::Other => {
                KakeboCategory::Unexpected
            }
            Self::Salary | Self::Investment | Self::Freelance | Self::Business | Self::Gifts => {
                return Err(EngineError::InvalidArgument(format!(
                    "category '{}' is not an expense category",
                    self.as_str()
                )));
            }
        };
        Ok(bucket)
    }

    pub fn display_name(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Es => match self {
                Self::Salary => "Salario",
                Self::Investment => "Inversiones",
                Self::Freelance => "Freelance",
                Self::Business => "Negocio",
                Self::Gifts => "Regalos",
                Self::Housing => "Vivienda",
                Self::Food => "Comida",
                Self::Transportation => "Transporte",
                Self::Utilities => "Servicios",
                Self::Healthcare => "Salud",
                Self::Insurance => "Seguros",
                Self::Entertainment => "Entretenimiento",
                Self::Dining => "Restaurantes",
                Self::Shopping => "Compras",
                Self::Hobbies => "Aficiones",
                Self::Travel => "Viajes",
                Self::Sports => "Deportes",
                Self::Books => "Libros",
                Self::Education => "Educación",
                Self::Courses => "Cursos",
                Self::Subscriptions => "Suscripciones",
                Self::Emergency => "Emergencia",
                Self::Repairs => "Reparaciones",
                Self::Medical => "Médico",
                Self::Legal => "Legal",
                Self::Other => "Otros",
            },
            Locale::En => match self {
                Self::Salary => "Salary",
                Self::Investment => "Investments",
                Self::Freelance => "Freelance",
                Self::Business => "Business",
                Self::Gifts => "Gifts",
                Self::Housing => "Housing",
                Self::Food => "Food",
                Self::Transportation => "Transportation",
                Self::Utilities => "Utilities",
                Self::Healthcare => "Healthcare",
                Self::Insurance => "Insurance",
                Self::Entertainment => "Entertainment",
                Self::Dining => "Dining out",
                Self::Shopping => "Shopping",
                Self::Hobbies => "Hobbies",
                Self::Travel => "Travel",
                Self::Sports => "Sports",
                Self::Books => "Books",
                Self::Education => "Education",
                Self::Courses => "Courses",
                Self::Subscriptions => "Subscriptions",
                Self::Emergency => "Emergency",
                Self::Repairs => "Repairs",
                Self::Medical => "Medical",
                Self::Legal => "Legal",
                Self::Other => "Other",
            },
        }
    }

    /// `"<display> - <subcategory>"`, or just the display name when the
    /// subcategory is missing or blank.
    pub fn full_name(self, subcategory: Option<&str>, locale: Locale) -> String {
        let display = self.display_name(locale);
        match subcategory.map(str::trim) {
            Some(sub) if !sub.is_empty() => format!("{display} - {sub}"),
            _ => display.to_string(),
        }
    }

    /// Autocomplete suggestions. Subcategories are free text and never
    /// checked against this list.
    pub fn common_subcategories(self) -> &'static [&'static str] {
        match self {
            Self::Housing => &["Alquiler", "Hipoteca", "Mantenimiento", "Muebles", "Decoración"],
            Self::Food => &["Supermercado", "Mercado", "Carnicería", "Panadería", "Verdulería"],
            Self::Transportation => &[
                "Gasolina",
                "Transporte público",
                "Taxi",
                "Uber",
                "Parking",
                "Mantenimiento vehículo",
            ],
            Self::Utilities => &["Electricidad", "Agua", "Gas", "Internet", "Teléfono", "Basura"],
            Self::Healthcare => &[
                "Médico",
                "Dentista",
                "Farmacia",
                "Análisis",
                "Especialista",
                "Emergencia",
            ],
            Self::Insurance => &["Salud", "Vida", "Hogar", "Vehículo", "Responsabilidad civil"],
            Self::Entertainment => &[
                "Cine",
                "Teatro",
                "Conciertos",
                "Videojuegos",
                "Streaming",
                "Parques",
            ],
            Self::Dining => &[
                "Desayuno",
                "Almuerzo",
                "Cena",
                "Cafetería",
                "Bar",
                "Comida rápida",
            ],
            Self::Shopping => &["Ropa", "Calzado", "Accesorios", "Electrónicos", "Hogar", "Regalos"],
            Self::Hobbies => &[
                "Deportes",
                "Arte",
                "Música",
                "Fotografía",
                "Jardinería",
                "Colecciones",
            ],
            Self::Travel => &[
                "Vuelos",
                "Hotel",
                "Alquiler coche",
                "Excursiones",
                "Comidas",
                "Souvenirs",
            ],
            Self::Sports => &["Gimnasio", "Clases", "Equipamiento", "Competiciones", "Nutrición"],
            Self::Books => &[
                "Ficción",
                "No ficción",
                "Técnicos",
                "Académicos",
                "Revistas",
                "Audiolibros",
            ],
            Self::Education => &["Matrícula", "Libros", "Material", "Transporte", "Alojamiento"],
            Self::Courses => &["Online", "Presencial", "Certificaciones", "Talleres", "Seminarios"],
            Self::Subscriptions => &["Netflix", "Spotify", "Revistas", "Software", "Noticias", "Fitness"],
            Self::Emergency => &["Médica", "Hogar", "Vehículo", "Familia", "Trabajo", "Legal"],
            Self::Repairs => &["Hogar", "Vehículo", "Electrónicos", "Ropa", "Muebles"],
            Self::Medical => &["Urgencias", "Medicamentos", "Tratamientos", "Cirugía", "Terapia"],
            Self::Legal => &["Abogado", "Notario", "Multas", "Trámites", "Documentos"],
            Self::Salary => &["Salario base", "Extras", "Comisiones", "Bonus", "Aguinaldo"],
            Self::Investment => &[
                "Dividendos",
                "Intereses",
                "Ganancias capital",
                "Alquiler",
                "Royalties",
            ],
            Self::Freelance => &["Consultoría", "Diseño", "Programación", "Redacción", "Traducción"],
            Self::Business => &["Ventas", "Servicios", "Productos", "Comisiones", "Licencias"],
            Self::Gifts => &["Familia", "Amigos", "Premios", "Herencias", "Devoluciones"],
            Self::Other => &["Varios", "Misceláneos", "Sin clasificar"],
        }
    }

    pub fn is_valid_for(self, kind: TransactionType) -> bool {
        match kind {
            TransactionType::Income => self.is_income(),
            TransactionType::Expense => !self.is_income(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == code)
            .ok_or_else(|| EngineError::InvalidArgument(format!("invalid category: {value}")))
    }
}

pub fn income_categories() -> Vec<Category> {
    Category::ALL.into_iter().filter(|c| c.is_income()).collect()
}

pub fn expense_categories() -> Vec<Category> {
    Category::ALL.into_iter().filter(|c| !c.is_income()).collect()
}

/// Expense categories that land in `bucket`.
pub fn categories_in(bucket: KakeboCategory) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|c| c.bucket().ok() == Some(bucket))
        .collect()
}

/// Category preselected for a new transaction of the given type.
pub fn default_category(kind: TransactionType) -> Category {
    match kind {
        TransactionType::Income => Category::Salary,
        TransactionType::Expense => Category::Food,
    }
}
