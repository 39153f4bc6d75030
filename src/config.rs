use crate::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const BACKEND_URL_ENV: &str = "PETCARE_BACKEND_URL";
pub const RAZORPAY_KEY_ENV: &str = "PETCARE_RAZORPAY_KEY";

/// Paths of the backend endpoints, relative to `backend_url`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Endpoints {
    pub subscription: String,
    pub grooming_visit: String,
    pub verify_payment: String,
    pub create_order: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            subscription: "/subscription".to_string(),
            grooming_visit: "/visit/grooming".to_string(),
            verify_payment: "/payment/verify".to_string(),
            create_order: "/payment/create-order".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Slide {
    pub image: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub interval_ms: u64,
    pub slides: Vec<Slide>,
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        let images = ["1.jpeg", "2.jpeg", "3.png", "4.png", "5.jpeg", "6.jpg"];
        Self {
            interval_ms: 5000,
            slides: images
                .iter()
                .enumerate()
                .map(|(i, image)| Slide {
                    image: format!("/images/{image}"),
                    alt: format!("Pet care {}", i + 1),
                })
                .collect(),
        }
    }
}

/// Client configuration.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub razorpay_key_id: String,
    pub business_name: String,
    pub theme_color: String,
    pub currency: String,
    pub endpoints: Endpoints,
    pub carousel: CarouselConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000/api".to_string(),
            razorpay_key_id: String::new(),
            business_name: "Pet Grooming Service".to_string(),
            theme_color: "#3399cc".to_string(),
            currency: "INR".to_string(),
            endpoints: Endpoints::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BookingError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reads `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            self.backend_url = url;
        }
        if let Some(key) = lookup(RAZORPAY_KEY_ENV) {
            self.razorpay_key_id = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(BookingError::Config("backend_url is empty".to_string()));
        }
        if self.carousel.interval_ms == 0 {
            return Err(BookingError::Config(
                "carousel.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.carousel.slides.is_empty() {
            return Err(BookingError::Config(
                "carousel.slides must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Joins `backend_url` and an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.business_name, "Pet Grooming Service");
        assert_eq!(config.carousel.slides.len(), 6);
        assert_eq!(config.carousel.slides[2].image, "/images/3.png");
        assert_eq!(config.carousel.interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = \"https://api.example.com/v1/\"").unwrap();
        writeln!(file, "[endpoints]").unwrap();
        writeln!(file, "verify_payment = \"/razorpay/verify\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.currency, "INR");
        assert_eq!(config.endpoints.grooming_visit, "/visit/grooming");
        assert_eq!(
            config.endpoint_url(&config.endpoints.verify_payment),
            "https://api.example.com/v1/razorpay/verify"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| match name {
            BACKEND_URL_ENV => Some("https://backend.test".to_string()),
            RAZORPAY_KEY_ENV => Some("rzp_test_123".to_string()),
            _ => None,
        });
        assert_eq!(config.backend_url, "https://backend.test");
        assert_eq!(config.razorpay_key_id, "rzp_test_123");
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = [").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(BookingError::Toml(_))
        ));
    }

    #[test]
    fn test_empty_slides_rejected() {
        let mut config = AppConfig::default();
        config.carousel.slides.clear();
        assert!(matches!(config.validate(), Err(BookingError::Config(_))));
    }
}
