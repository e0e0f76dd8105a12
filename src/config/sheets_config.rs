#[derive(serde::Deserialize, Debug, Clone)]
pub struct SheetsConfig {
    /// Path to the Google service account key file.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: Box<str>,
}

fn default_sheet_name() -> Box<str> {
    "Sheet1".into()
}
