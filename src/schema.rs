//! Column and attribute names of the source files.
//! Loaders check headers against these before reading any rows.

// ── Yearly production by field (CSV) ────────────────────────────────────────
pub mod production {
    pub const CARRIER_NAME: &str = "prfInformationCarrier";
    pub const CARRIER_ID: &str = "prfNpdidInformationCarrier";
    pub const YEAR: &str = "prfYear";
    pub const NET_OE: &str = "prfPrdOeNetMillSm3";

    pub const OIL: &str = "prfPrdOilNetMillSm3";
    pub const GAS: &str = "prfPrdGasNetBillSm3";
    pub const NGL: &str = "prfPrdNGLNetMillSm3";
    pub const CONDENSATE: &str = "prfPrdCondensateNetMillSm3";
    pub const PRODUCED_WATER: &str = "prfPrdProducedWaterInFieldMillSm3";

    pub const REQUIRED: [&str; 4] = [CARRIER_NAME, CARRIER_ID, YEAR, NET_OE];
}

// ── Yearly national totals (CSV) ────────────────────────────────────────────
pub mod totals {
    pub const YEAR: &str = "prfYear";
    pub const NET_OE: &str = "prfPrdOeNetMillSm3";

    pub const REQUIRED: [&str; 2] = [YEAR, NET_OE];
}

// ── Field area shapefile (dBase attributes) ─────────────────────────────────
pub mod fields {
    pub const FIELD_ID: &str = "idField";
    pub const FIELD_NAME: &str = "fieldName";
    pub const OPERATOR: &str = "OpLongName";
    pub const HC_TYPE: &str = "Dctype";
    pub const REGION: &str = "main_area";

    pub const REQUIRED: [&str; 5] = [FIELD_ID, FIELD_NAME, OPERATOR, HC_TYPE, REGION];
}

/// Returns the entries of `required` that are not in `present`.
pub fn missing_columns<'a, I>(required: &[&str], present: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = present.into_iter().map(str::trim).collect();
    required
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_absent_columns() {
        let header = ["prfYear", " prfPrdOeNetMillSm3 ", "other"];
        assert!(missing_columns(&totals::REQUIRED, header).is_empty());

        let missing = missing_columns(&production::REQUIRED, header);
        assert_eq!(missing, vec![production::CARRIER_NAME, production::CARRIER_ID]);
    }
}
