pub mod cart;
pub mod catalog;
pub mod media;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{CartItem, CartItemView, CartRecordView};
pub use catalog::{Brand, BrandView, Category, CategoryView, Gender, GenderRecord, GenderView};
pub use media::{Media, MediaView};
pub use order::{Order, OrderStatus, OrderView, ShippingAddress};
pub use product::{PopulatedProductView, Product, ProductView};
pub use review::{Review, ReviewView};
pub use user::{Role, User, UserView};
