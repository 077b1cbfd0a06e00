use restock_inventory::Catalog;

use crate::session::SessionError;

/// Classifier inputs for every record, in catalog order.
pub fn scoring_inputs(catalog: &Catalog) -> Vec<[f64; 3]> {
    catalog.iter().map(|r| r.features.to_array()).collect()
}

/// Build the labeled replacement catalog from one raw score per record.
///
/// The input catalog is left untouched; the caller swaps the result in.
pub fn label_catalog(catalog: &Catalog, scores: &[f64]) -> Result<Catalog, SessionError> {
    if scores.len() != catalog.len() {
        return Err(SessionError::InvalidCatalog(format!(
            "got {} scores for {} records",
            scores.len(),
            catalog.len()
        )));
    }

    let records = catalog
        .iter()
        .zip(scores)
        .map(|(record, &score)| record.with_score(score))
        .collect();

    Catalog::from_records(records).map_err(|e| SessionError::InvalidCatalog(e.to_string()))
}
