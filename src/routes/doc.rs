use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::sales::{DailyReport, RecordSaleRequest, SaleCreated, SaleLineRequest, SaleWithItems},
    error::ErrorBody,
    models::{Product, Sale, SaleItem},
    routes::{health, products, report, sales},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        sales::record_sale,
        sales::get_sale,
        report::daily_report,
    ),
    components(
        schemas(
            Product,
            Sale,
            SaleItem,
            RecordSaleRequest,
            SaleLineRequest,
            SaleCreated,
            SaleWithItems,
            DailyReport,
            ErrorBody,
            health::HealthData,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog"),
        (name = "Sales", description = "Sale recording"),
        (name = "Reports", description = "Daily totals"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
