use axum::{Json, extract::State};
use rz_api_types::{AccountAssociation, MiniAppFrame, MiniAppManifest};

use crate::AppState;

const APP_NAME: &str = "Rozo";
const SPLASH_BACKGROUND: &str = "#ffffff";

/// Host-client manifest. Asset URLs hang off the public origin.
pub(crate) fn build_manifest(public_url: &str, account_association: AccountAssociation) -> MiniAppManifest {
    MiniAppManifest {
        account_association,
        frame: MiniAppFrame {
            version: "1".to_owned(),
            name: APP_NAME.to_owned(),
            icon_url: format!("{public_url}/icon.png"),
            home_url: public_url.to_owned(),
            image_url: format!("{public_url}/image.png"),
            button_title: "Open Rozo".to_owned(),
            splash_image_url: format!("{public_url}/splash.png"),
            splash_background_color: SPLASH_BACKGROUND.to_owned(),
            webhook_url: Some(format!("{public_url}/api/webhook")),
        },
    }
}

pub(crate) async fn farcaster_manifest(State(state): State<AppState>) -> Json<MiniAppManifest> {
    Json(state.manifest.as_ref().clone())
}
