pub mod products;
pub mod sale_items;
pub mod sales;

pub use products::Entity as Products;
pub use sale_items::Entity as SaleItems;
pub use sales::Entity as Sales;
