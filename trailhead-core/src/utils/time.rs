use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Restituisce l'istante corrente in UTC formattato come RFC3339 (es. "2025-11-02T12:34:56Z").
/// Usato per `created_at` e `updated_at` di tutte le entità.
pub fn now_timestamp() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Formatta un istante con precisione al secondo.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let at = at.replace_nanosecond(0).unwrap_or(at);
    // RFC3339 fallisce solo per anni fuori da 0..=9999: now_utc e gli istanti
    // letti dal database restano in quell'intervallo
    at.format(&Rfc3339).expect("error formatting timestamp")
}
