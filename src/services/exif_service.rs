use chrono::NaiveDateTime;
use exif::{In, Tag, Value};
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;

use crate::error::Result;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Facts read out of an image's EXIF block, already formatted for captions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInsights {
    /// Capture date like "May 19, 2024".
    pub captured_on: Option<String>,
    /// Camera label like "Canon EOS R5".
    pub camera: Option<String>,
    /// Decimal coordinates like "48.8584, 2.2945".
    pub location: Option<String>,
}

impl ImageInsights {
    pub fn is_empty(&self) -> bool {
        self.captured_on.is_none() && self.camera.is_none() && self.location.is_none()
    }
}

#[derive(Clone)]
pub struct ExifService {
    client: Client,
}

impl ExifService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Best effort: most hosted images are re-encoded with their EXIF
    /// stripped, so every failure here just means "no insights".
    pub async fn inspect(&self, image_url: &str) -> ImageInsights {
        match self.fetch_and_parse(image_url).await {
            Ok(insights) => insights,
            Err(err) => {
                tracing::debug!("no EXIF insights for {}: {}", image_url, err);
                ImageInsights::default()
            }
        }
    }

    async fn fetch_and_parse(&self, image_url: &str) -> Result<ImageInsights> {
        let resp = self
            .client
            .get(image_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("image fetch returned {}", resp.status()).into());
        }
        if let Some(length) = resp.content_length() {
            if length > MAX_IMAGE_BYTES {
                return Err(anyhow::anyhow!("image is {} bytes, over the EXIF limit", length).into());
            }
        }

        let bytes = resp.bytes().await?;
        if bytes.len() as u64 > MAX_IMAGE_BYTES {
            return Err(anyhow::anyhow!("image body exceeded the EXIF limit").into());
        }

        parse_insights(&bytes)
    }
}

/// Pulls the caption-relevant fields out of raw image bytes.
pub fn parse_insights(bytes: &[u8]) -> Result<ImageInsights> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new()
        .read_from_container(&mut cursor)
        .map_err(|err| anyhow::anyhow!("EXIF parse failed: {}", err))?;

    let captured_on = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime]
        .into_iter()
        .find_map(|tag| ascii_field(&exif, tag))
        .and_then(|raw| format_capture_date(&raw));

    let camera = camera_label(
        ascii_field(&exif, Tag::Make).as_deref(),
        ascii_field(&exif, Tag::Model).as_deref(),
    );

    let latitude = gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let longitude = gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
    let location = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(format!("{:.4}, {:.4}", lat, lon)),
        _ => None,
    };

    Ok(ImageInsights {
        captured_on,
        camera,
        location,
    })
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(items) => items
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_matches(char::from(0))
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// EXIF dates come as "2024:05:19 10:30:00"; captions want "May 19, 2024".
fn format_capture_date(raw: &str) -> Option<String> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    Some(parsed.format("%B %-d, %Y").to_string())
}

/// Many vendors repeat the make inside the model ("Canon" / "Canon EOS R5"),
/// so only prepend it when the model does not already start with it.
fn camera_label(make: Option<&str>, model: Option<&str>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) => {
            if model.to_lowercase().starts_with(&make.to_lowercase()) {
                Some(model.to_string())
            } else {
                Some(format!("{} {}", make, model))
            }
        }
        (None, Some(model)) => Some(model.to_string()),
        (Some(make), None) => Some(make.to_string()),
        (None, None) => None,
    }
}

fn gps_coordinate(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let parts = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => parts,
        _ => return None,
    };
    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    if !degrees.is_finite() {
        return None;
    }
    let reference = ascii_field(exif, ref_tag)?;
    match reference.as_str() {
        "S" | "W" => Some(-degrees),
        _ => Some(degrees),
    }
}
