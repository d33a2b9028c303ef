use std::error::Error;

pub type ModelId = i64;

pub type GenericError = Box<dyn Error + Send + Sync>;

pub mod offer;
pub mod order;
pub mod product;
pub mod sea_orm_storage_model;
pub mod session;

pub use offer::Offer;
pub use order::{
    DeliveryType, DiscountType, Order, OrderDraft, OrderIdentifiers, OrderItem, OrderPayload,
    OrderStatus, PaymentMethod, PaymentStatus, PaymentUpdate, PickupLocation, ProductRef,
    ShippingAddress, TrackingUpdate,
};
pub use product::{PackSize, PricingTier, Product, ProductFilter, ProductType};
pub use session::{Role, Session};
