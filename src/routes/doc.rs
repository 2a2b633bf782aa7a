use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartEntry, CartTotals},
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
        orders::{AdminOrderList, AdminOrderRow, CheckoutRequest, OrderList, OrderWithItems},
        products::{
            CategoryList, InventoryLevel, ProductDetail, ProductList, ProductSummary,
            StoreAvailability,
        },
        stores::StoreList,
    },
    models::{Category, Order, OrderItem, OrderStatus, Product, Store, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products, stores},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::list_categories,
        stores::list_stores,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::set_inventory,
        admin::create_product,
        admin::update_product,
        admin::delete_product
    ),
    components(
        schemas(
            User,
            Category,
            Store,
            Product,
            Order,
            OrderItem,
            OrderStatus,
            CartEntry,
            CartTotals,
            CartView,
            AddToCartRequest,
            UpdateCartItemRequest,
            CheckoutRequest,
            OrderWithItems,
            OrderList,
            AdminOrderRow,
            AdminOrderList,
            ProductSummary,
            ProductList,
            StoreAvailability,
            ProductDetail,
            CategoryList,
            InventoryLevel,
            StoreList,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            admin::UpdateOrderStatusRequest,
            admin::SetInventoryRequest,
            admin::CreateProductRequest,
            admin::UpdateProductRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AdminOrderList>,
            ApiResponse<StoreList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Stores", description = "Collection point endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout and order endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
