use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use google_sheets4::{hyper, hyper_rustls};

use crate::config::sheets_config::SheetsConfig;

use super::spreadsheet_manager::SpreadsheetManagerError;

pub async fn auth(
    config: &SheetsConfig,
    client: hyper::Client<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
) -> error_stack::Result<
    Authenticator<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    SpreadsheetManagerError,
> {
    let secret: oauth2::ServiceAccountKey =
        oauth2::read_service_account_key(config.priv_key.as_ref())
            .await
            .change_context(SpreadsheetManagerError::AuthError)?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SpreadsheetManagerError::AuthError)
}
