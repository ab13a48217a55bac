//! HTTP surface over the catalog and cart services

use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationError};

use crate::domain::aggregates::{
    CartLine, CartLinePatch, ColorCombination, ColorScheme, Component, ConfigurationReport, ExtendedOrderFields,
    ExtendedOrderPatch, NewCartLine, Part, ProductGroup, RawColorSelection, Sku,
};
use crate::domain::color::{ColorCardEntry, ColorFamily, ColorLabel};
use crate::domain::services::Selection;
use crate::domain::value_objects::{ColorValue, Money};
use crate::services::{CartService, CatalogService, ImportPreview};
use crate::CatalogError;

#[derive(Clone)]
pub struct AppState { pub catalog: Arc<CatalogService>, pub carts: Arc<CartService>, pub currency: String }

type ApiResult<T> = Result<T, (StatusCode, String)>;

fn reject(e: CatalogError) -> (StatusCode, String) {
    let status = match &e {
        CatalogError::NotFound { .. } | CatalogError::CartItemNotFound => StatusCode::NOT_FOUND,
        CatalogError::Validation(_) | CatalogError::InvalidScheme(_) | CatalogError::InvalidComponent(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::CombinationConflict { .. } => StatusCode::CONFLICT,
        CatalogError::VersionConflict | CatalogError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn checked<T: Validate>(request: &T) -> ApiResult<()> {
    request.validate().map_err(|e| reject(e.into()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-catalog"})) }))
        .route("/api/v1/colors/resolve", post(resolve_color))
        .route("/api/v1/colors/decompose", post(decompose_color))
        .route("/api/v1/colors/cards", get(list_cards))
        .route("/api/v1/components", get(list_components).post(create_component))
        .route("/api/v1/components/:code", get(get_component).put(update_component).delete(delete_component))
        .route("/api/v1/groups", get(list_groups).post(create_group))
        .route("/api/v1/groups/:id", get(get_group))
        .route("/api/v1/groups/:id/components", put(select_components))
        .route("/api/v1/groups/:id/components/:code/scheme-template", get(scheme_template))
        .route("/api/v1/groups/:id/components/:code/schemes", post(add_scheme))
        .route("/api/v1/groups/:id/components/:code/schemes/:index", get(edit_scheme).put(replace_scheme).delete(delete_scheme))
        .route("/api/v1/groups/:id/validation", get(validate_group))
        .route("/api/v1/groups/:id/skus", get(list_skus).post(create_sku))
        .route("/api/v1/groups/:id/resolve", post(resolve_sku))
        .route("/api/v1/import/preview", post(preview_import))
        .route("/api/v1/cart/:customer", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/:customer/items", post(add_cart_item))
        .route("/api/v1/cart/:customer/items/:line_id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/cart/:customer/sync", post(sync_cart))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

// =============================================================================
// Colors
// =============================================================================

#[derive(Debug, Deserialize)] pub struct ColorTextRequest { pub text: String }
#[derive(Debug, Serialize)] pub struct ResolveColorResponse { pub input: String, pub color: Option<ColorValue> }
#[derive(Debug, Deserialize)] pub struct CardParams { pub family: Option<String> }
#[derive(Debug, Serialize)] pub struct FamilyCards { pub family: ColorFamily, pub cards: Vec<ColorCardEntry> }

async fn resolve_color(State(s): State<AppState>, Json(r): Json<ColorTextRequest>) -> Json<ResolveColorResponse> {
    let color = s.catalog.resolve_color(&r.text);
    Json(ResolveColorResponse { input: r.text, color })
}

async fn decompose_color(State(s): State<AppState>, Json(r): Json<ColorTextRequest>) -> Json<ColorLabel> {
    Json(s.catalog.decompose_color_label(&r.text))
}

/// Cards grouped by family for pickers, optionally a single family.
async fn list_cards(State(s): State<AppState>, Query(p): Query<CardParams>) -> Json<Vec<FamilyCards>> {
    Json(s.catalog.registry().by_family().into_iter()
        .filter(|(family, _)| p.family.as_deref().map_or(true, |wanted| wanted == family.key()))
        .map(|(family, cards)| FamilyCards { family, cards: cards.into_iter().cloned().collect() })
        .collect())
}

// =============================================================================
// Components
// =============================================================================

#[derive(Debug, Deserialize, Serialize)] pub struct PartRequest { pub name_local: String, pub name_alt: String }

#[derive(Debug, Deserialize, Validate)]
pub struct ComponentRequest {
    #[validate(length(min = 1))] pub code: String,
    pub name_local: String,
    pub name_alt: String,
    #[validate(length(min = 1))] pub parts: Vec<PartRequest>,
}

impl ComponentRequest {
    fn parts(&self) -> Vec<Part> { self.parts.iter().map(|p| Part::new(p.name_local.trim(), p.name_alt.trim())).collect() }
}

async fn list_components(State(s): State<AppState>) -> ApiResult<Json<Vec<Component>>> {
    s.catalog.list_components().map(Json).map_err(reject)
}

async fn get_component(State(s): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<Component>> {
    s.catalog.component(&code).map(Json).map_err(reject)
}

async fn create_component(State(s): State<AppState>, Json(r): Json<ComponentRequest>) -> ApiResult<(StatusCode, Json<Component>)> {
    checked(&r)?;
    let c = s.catalog.create_component(&r.code, &r.name_local, &r.name_alt, r.parts()).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(c)))
}

async fn update_component(State(s): State<AppState>, Path(code): Path<String>, Json(r): Json<ComponentRequest>) -> ApiResult<Json<Component>> {
    checked(&r)?;
    s.catalog.update_component(&code, &r.name_local, &r.name_alt, r.parts()).map(Json).map_err(reject)
}

async fn delete_component(State(s): State<AppState>, Path(code): Path<String>) -> ApiResult<StatusCode> {
    s.catalog.delete_component(&code).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Product groups and schemes
// =============================================================================

#[derive(Debug, Deserialize)] pub struct CreateGroupRequest { pub name_local: String, pub name_alt: String }
#[derive(Debug, Deserialize)] pub struct SelectComponentsRequest { pub codes: Vec<String> }

async fn list_groups(State(s): State<AppState>) -> ApiResult<Json<Vec<ProductGroup>>> {
    s.catalog.list_groups().map(Json).map_err(reject)
}

async fn get_group(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ProductGroup>> {
    s.catalog.group(&id).map(Json).map_err(reject)
}

async fn create_group(State(s): State<AppState>, Json(r): Json<CreateGroupRequest>) -> ApiResult<(StatusCode, Json<ProductGroup>)> {
    let g = s.catalog.create_group(&r.name_local, &r.name_alt).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(g)))
}

async fn select_components(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<SelectComponentsRequest>) -> ApiResult<Json<ProductGroup>> {
    s.catalog.select_components(&id, r.codes).map(Json).map_err(reject)
}

async fn scheme_template(State(s): State<AppState>, Path((id, code)): Path<(String, String)>) -> ApiResult<Json<ColorScheme>> {
    s.catalog.new_scheme_template(&id, &code).map(Json).map_err(reject)
}

async fn edit_scheme(State(s): State<AppState>, Path((id, code, index)): Path<(String, String, usize)>) -> ApiResult<Json<ColorScheme>> {
    s.catalog.edit_scheme(&id, &code, index).map(Json).map_err(reject)
}

async fn add_scheme(State(s): State<AppState>, Path((id, code)): Path<(String, String)>, Json(scheme): Json<ColorScheme>) -> ApiResult<(StatusCode, Json<ProductGroup>)> {
    let g = s.catalog.save_scheme(&id, &code, None, scheme).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(g)))
}

async fn replace_scheme(State(s): State<AppState>, Path((id, code, index)): Path<(String, String, usize)>, Json(scheme): Json<ColorScheme>) -> ApiResult<Json<ProductGroup>> {
    s.catalog.save_scheme(&id, &code, Some(index), scheme).map(Json).map_err(reject)
}

async fn delete_scheme(State(s): State<AppState>, Path((id, code, index)): Path<(String, String, usize)>) -> ApiResult<Json<ColorScheme>> {
    s.catalog.delete_scheme(&id, &code, index).map(Json).map_err(reject)
}

async fn validate_group(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ConfigurationReport>> {
    s.catalog.validate_group(&id).map(Json).map_err(reject)
}

// =============================================================================
// SKUs
// =============================================================================

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() { return Err(ValidationError::new("negative_price")); }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSkuRequest {
    #[validate(length(min = 1))] pub product_code: String,
    #[validate(custom = "non_negative")] pub price: Decimal,
    #[serde(default)] pub color_combination: ColorCombination,
}

#[derive(Debug, Serialize)] pub struct ResolveSkuResponse { pub available: bool, pub sku: Option<Sku> }

async fn list_skus(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Sku>>> {
    s.catalog.group(&id).map_err(reject)?;
    s.catalog.skus_of(&id).map(Json).map_err(reject)
}

async fn create_sku(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<CreateSkuRequest>) -> ApiResult<(StatusCode, Json<Sku>)> {
    checked(&r)?;
    let sku = s.catalog.create_sku(&id, &r.product_code, Money::new(r.price, &s.currency), r.color_combination).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(sku)))
}

/// An unavailable combination is a normal answer, not a 404.
async fn resolve_sku(State(s): State<AppState>, Path(id): Path<String>, Json(selection): Json<Selection>) -> ApiResult<Json<ResolveSkuResponse>> {
    let sku = s.catalog.resolve_sku(&id, &selection).map_err(reject)?;
    Ok(Json(ResolveSkuResponse { available: sku.is_some(), sku }))
}

// =============================================================================
// Import
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ImportPreviewRequest { #[serde(default)] pub spec: String, #[serde(default)] pub colors: String, #[serde(default)] pub product_name: String }

async fn preview_import(State(s): State<AppState>, Json(r): Json<ImportPreviewRequest>) -> Json<ImportPreview> {
    Json(s.catalog.preview_import(&r.spec, &r.colors, &r.product_name))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    #[validate(length(min = 1))] pub sku_id: String,
    #[validate(length(min = 1))] pub product_code: String,
    #[validate(length(min = 1))] pub product_name: String,
    #[serde(default)] pub color_scheme: Option<RawColorSelection>,
    #[validate(range(min = 1))] pub quantity: u32,
    #[validate(custom = "non_negative")] pub price: Decimal,
    #[serde(flatten)] pub extended: ExtendedOrderFields,
}

impl AddCartItemRequest {
    fn into_line(self, currency: &str) -> NewCartLine {
        NewCartLine {
            sku_id: self.sku_id, product_code: self.product_code, product_name: self.product_name,
            color_scheme: self.color_scheme.map(RawColorSelection::normalize).unwrap_or_default(),
            quantity: self.quantity, price: Money::new(self.price, currency), extended: self.extended,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1))] pub quantity: Option<u32>,
    #[validate(custom = "non_negative")] pub price: Option<Decimal>,
    #[serde(flatten)] pub extended: ExtendedOrderPatch,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SyncCartRequest { #[validate] pub items: Vec<AddCartItemRequest> }

async fn get_cart(State(s): State<AppState>, Path(customer): Path<String>) -> ApiResult<Json<Vec<CartLine>>> {
    s.carts.get_cart(&customer).map(Json).map_err(reject)
}

async fn add_cart_item(State(s): State<AppState>, Path(customer): Path<String>, Json(r): Json<AddCartItemRequest>) -> ApiResult<(StatusCode, Json<CartLine>)> {
    checked(&r)?;
    let added = s.carts.add_item(&customer, r.into_line(&s.currency)).map_err(reject)?;
    let status = if added.merged { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(added.line)))
}

async fn update_cart_item(State(s): State<AppState>, Path((customer, line_id)): Path<(String, String)>, Json(r): Json<UpdateCartItemRequest>) -> ApiResult<Json<CartLine>> {
    checked(&r)?;
    let patch = CartLinePatch { quantity: r.quantity, price: r.price.map(|p| Money::new(p, &s.currency)), extended: r.extended };
    s.carts.update_item(&customer, &line_id, patch).map(Json).map_err(reject)
}

async fn remove_cart_item(State(s): State<AppState>, Path((customer, line_id)): Path<(String, String)>) -> ApiResult<StatusCode> {
    s.carts.remove_item(&customer, &line_id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(State(s): State<AppState>, Path(customer): Path<String>) -> ApiResult<StatusCode> {
    s.carts.clear_cart(&customer).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn sync_cart(State(s): State<AppState>, Path(customer): Path<String>, Json(r): Json<SyncCartRequest>) -> ApiResult<Json<Vec<CartLine>>> {
    checked(&r)?;
    let lines = r.items.into_iter().map(|i| i.into_line(&s.currency)).collect();
    s.carts.sync_cart(&customer, lines).map(Json).map_err(reject)
}
