// The sheet layout is hardcoded to keep the code simple.

pub mod credentials {
    /// Row 1 is the header; credential rows start here.
    pub const FIRST_DATA_ROW: u32 = 2;
    /// Column B: encrypted API key.
    pub const COL_API_KEY: u32 = 2;
    /// Column C: encrypted API secret.
    pub const COL_API_SECRET: u32 = 3;
    /// Column E: optional sub-account/member identifier.
    pub const COL_MEMBER_ID: u32 = 5;
}

pub mod output {
    /// Column A: formatted account total.
    pub const COL_TOTAL: u32 = 1;
    /// Column E: raw reference-asset amount.
    pub const COL_REFERENCE_AMOUNT: u32 = 5;
}
