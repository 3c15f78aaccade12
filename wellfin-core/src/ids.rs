use chrono::Utc;

const SUFFIX_LEN: usize = 9;

/// Generates an identifier of the form `<prefix>_<unix-millis>_<9 random chars>`.
///
/// The random tail comes from a v4 UUID, so two calls within the same
/// millisecond still produce distinct ids.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{millis}_{}", &random[..SUFFIX_LEN])
}
