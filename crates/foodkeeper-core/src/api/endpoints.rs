//! FoodKeeper backend endpoints, all routed through [`ApiClient::execute`].

use std::time::Duration;

use tracing::{info, warn};

use crate::auth::{Credentials, SocialProvider};
use crate::models::auth::SocialLoginRequest;
use crate::models::recipe::RecipeRequest;
use crate::models::{sort_by_urgency, FoodItem, LoginResponse, NewFoodItem, Recipe};

use super::{ApiClient, ApiError, ApiRequest};

/// Recipe generation runs an LLM on the server and regularly takes longer
/// than ordinary calls.
const RECIPE_TIMEOUT_SECS: u64 = 90;

impl ApiClient {
    /// Exchange a social provider's token for FoodKeeper credentials and
    /// remember them.
    pub async fn login_with_provider(
        &self,
        provider: SocialProvider,
        provider_token: &str,
    ) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(format!("/auth/login/{}", provider.as_path()))
            .public()
            .json(&SocialLoginRequest { provider_token })?;

        let login: LoginResponse = self.execute(&request).await?;

        self.store()
            .save_credentials(&Credentials::new(&login.access_token, &login.refresh_token))
            .map_err(ApiError::Storage)?;
        self.store()
            .set_user_id(login.user_id)
            .map_err(ApiError::Storage)?;

        info!(
            provider = %provider,
            user_id = login.user_id,
            new_user = login.is_new_user,
            "Signed in"
        );
        Ok(login)
    }

    /// Sign out. Local credentials are cleared even if the server call fails.
    ///
    /// An expired token is not refreshed here, so a rejected logout never
    /// ends the session through [`SessionEvents`](crate::auth::SessionEvents).
    pub async fn logout(&self) -> Result<(), ApiError> {
        let logged_in = self.store().is_logged_in().map_err(ApiError::Storage)?;
        if logged_in {
            let request = ApiRequest::post("/auth/logout").without_refresh();
            if let Err(e) = self.execute::<()>(&request).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        self.store()
            .clear_credentials()
            .map_err(ApiError::Storage)?;
        info!("Signed out");
        Ok(())
    }

    /// All tracked items, most urgent first
    pub async fn fetch_foods(&self) -> Result<Vec<FoodItem>, ApiError> {
        let mut foods: Vec<FoodItem> = self.execute(&ApiRequest::get("/foods")).await?;
        sort_by_urgency(&mut foods);
        Ok(foods)
    }

    /// Items expiring within `days` days (already expired ones included)
    pub async fn fetch_expiring_foods(&self, days: u32) -> Result<Vec<FoodItem>, ApiError> {
        let request = ApiRequest::get("/foods").query("withinDays", days);
        let mut foods: Vec<FoodItem> = self.execute(&request).await?;
        sort_by_urgency(&mut foods);
        Ok(foods)
    }

    pub async fn add_food(&self, food: &NewFoodItem) -> Result<(), ApiError> {
        self.execute(&ApiRequest::post("/foods").json(food)?).await
    }

    pub async fn delete_food(&self, id: i64) -> Result<(), ApiError> {
        self.execute(&ApiRequest::delete(format!("/foods/{}", id))).await
    }

    /// Ask the backend for recipes that use up the given items
    pub async fn suggest_recipes(&self, food_ids: &[i64]) -> Result<Vec<Recipe>, ApiError> {
        let request = ApiRequest::post("/recipes/recommend")
            .json(&RecipeRequest { food_ids })?
            .timeout(Duration::from_secs(RECIPE_TIMEOUT_SECS));
        self.execute(&request).await
    }
}
