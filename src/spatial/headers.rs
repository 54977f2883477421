//! Header and page number detection.

use crate::document::Region;
use crate::geometry::Axis;

use super::matrix::RelationMatrix;
use super::relation::Relation;

/// Box area per transcribed character; `0.0` for empty transcriptions.
pub fn text_density(region: &Region) -> f64 {
    let chars = region.text().map(|t| t.chars().count()).unwrap_or(0);
    if chars == 0 {
        0.0
    } else {
        region.bbox().area() / chars as f64
    }
}

/// Ids of text regions whose density exceeds mean + standard deviation.
///
/// Headings are set in larger type than body text, so they cover more page
/// area per character.
pub fn detect_headers<'a, I>(text_regions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Region>,
{
    let densities: Vec<(&str, f64)> = text_regions
        .into_iter()
        .map(|r| (r.id(), text_density(r)))
        .collect();
    if densities.is_empty() {
        return Vec::new();
    }

    let values: Vec<f64> = densities.iter().map(|(_, d)| *d).collect();
    let (mean, std) = mean_std(&values);
    let limit = mean + std;

    let headers: Vec<String> = densities
        .into_iter()
        .filter(|(_, d)| *d > limit)
        .map(|(id, _)| id.to_string())
        .collect();
    log::debug!("detected {} header(s), density limit {:.2}", headers.len(), limit);
    headers
}

/// First purely numeric text region lying above or below every other
/// element of `relations`.
pub fn detect_page_number<'a, I>(text_regions: I, relations: &RelationMatrix) -> Option<String>
where
    I: IntoIterator<Item = &'a Region>,
{
    text_regions.into_iter().find_map(|region| {
        let text = region.text()?;
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let id = region.id();
        let others: Vec<Relation> = relations
            .ids()
            .filter(|other| *other != id)
            .map(|other| relations.relation(Axis::Y, id, other))
            .collect();
        let above = others.iter().all(|r| *r == Relation::Precedes);
        let below = others.iter().all(|r| *r == Relation::InversePrecedes);

        (above || below).then(|| id.to_string())
    })
}

/// Population mean and standard deviation.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
