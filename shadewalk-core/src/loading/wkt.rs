use geo::Geometry;
use log::warn;
use ::wkt::TryFromWkt;

/// Parses WKT rows (as returned by `ST_AsText`) into geometries.
///
/// Malformed rows are skipped with a warning rather than failing the batch.
pub fn parse_wkt_geometries<I, S>(rows: I) -> Vec<Geometry<f64>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(row, text)| {
            match Geometry::<f64>::try_from_wkt_str(text.as_ref()) {
                Ok(geometry) => Some(geometry),
                Err(e) => {
                    warn!("Skipping unparsable WKT in row {row}: {e}");
                    None
                }
            }
        })
        .collect()
}
