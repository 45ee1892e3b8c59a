//! Cart operations on top of the cart and catalogue repositories.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalogue_service::map_catalogue_error;
use crate::domain::ports::{
    CartRepository, CartRepositoryError, CatalogueRepository, ShoppingCart,
};
use crate::domain::{Cart, Error, Quantity, UserId};

pub(crate) fn map_cart_error(error: CartRepositoryError) -> Error {
    match error {
        CartRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("cart repository unavailable: {message}"))
        }
        CartRepositoryError::Query { message } => {
            Error::internal(format!("cart repository error: {message}"))
        }
    }
}

/// Cart service implementing [`ShoppingCart`].
#[derive(Clone)]
pub struct CartService<C, P> {
    carts: Arc<C>,
    catalogue: Arc<P>,
}

impl<C, P> CartService<C, P> {
    /// Create a service over cart and catalogue repositories.
    pub fn new(carts: Arc<C>, catalogue: Arc<P>) -> Self {
        Self { carts, catalogue }
    }
}

impl<C, P> CartService<C, P>
where
    C: CartRepository,
    P: CatalogueRepository,
{
    async fn reload(&self, user_id: &UserId) -> Result<Cart, Error> {
        self.carts.load(user_id).await.map_err(map_cart_error)
    }

    async fn require_orderable(&self, product_id: Uuid) -> Result<(), Error> {
        self.catalogue
            .find_product(product_id)
            .await
            .map_err(map_catalogue_error)?
            .filter(|product| product.is_available)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("product {product_id} not found")))
    }
}

#[async_trait]
impl<C, P> ShoppingCart for CartService<C, P>
where
    C: CartRepository,
    P: CatalogueRepository,
{
    async fn view(&self, user_id: &UserId) -> Result<Cart, Error> {
        self.reload(user_id).await
    }

    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Quantity,
    ) -> Result<Cart, Error> {
        self.require_orderable(product_id).await?;
        let cart = self.reload(user_id).await?;
        let merged = match cart
            .lines()
            .iter()
            .find(|line| line.product_id == product_id)
        {
            Some(line) => line
                .quantity
                .add(quantity)
                .map_err(|err| Error::invalid_field("quantity", err.to_string()))?,
            None => quantity,
        };
        self.carts
            .set_quantity(user_id, product_id, merged)
            .await
            .map_err(map_cart_error)?;
        self.reload(user_id).await
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Option<Quantity>,
    ) -> Result<Cart, Error> {
        let Some(quantity) = quantity else {
            return self.remove_item(user_id, product_id).await;
        };
        let cart = self.reload(user_id).await?;
        if !cart
            .lines()
            .iter()
            .any(|line| line.product_id == product_id)
        {
            return Err(Error::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        self.carts
            .set_quantity(user_id, product_id, quantity)
            .await
            .map_err(map_cart_error)?;
        self.reload(user_id).await
    }

    async fn remove_item(&self, user_id: &UserId, product_id: Uuid) -> Result<Cart, Error> {
        let removed = self
            .carts
            .remove(user_id, product_id)
            .await
            .map_err(map_cart_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        self.reload(user_id).await
    }

    async fn clear(&self, user_id: &UserId) -> Result<Cart, Error> {
        self.carts.clear(user_id).await.map_err(map_cart_error)?;
        Ok(Cart::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCartRepository, MockCatalogueRepository};
    use crate::test_support::{cart_line, product};
    use mockall::predicate::{always, eq};
    use rstest::rstest;

    type Service = CartService<MockCartRepository, MockCatalogueRepository>;

    fn service(carts: MockCartRepository, catalogue: MockCatalogueRepository) -> Service {
        CartService::new(Arc::new(carts), Arc::new(catalogue))
    }

    fn qty(value: u32) -> Quantity {
        Quantity::new(value).expect("quantity")
    }

    #[rstest]
    #[tokio::test]
    async fn adding_merges_with_an_existing_line() {
        let dish = product(900, 10);
        let id = dish.id;
        let mut catalogue = MockCatalogueRepository::new();
        let found = dish.clone();
        catalogue
            .expect_find_product()
            .return_once(move |_| Ok(Some(found)));
        let mut carts = MockCartRepository::new();
        let before = Cart::new(vec![cart_line(&dish, 2)]);
        let after = Cart::new(vec![cart_line(&dish, 5)]);
        let mut loads = vec![after, before];
        carts
            .expect_load()
            .times(2)
            .returning(move |_| Ok(loads.pop().unwrap_or_default()));
        carts
            .expect_set_quantity()
            .with(always(), eq(id), eq(qty(5)))
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let cart = service(carts, catalogue)
            .add_item(&UserId::random(), id, qty(3))
            .await
            .expect("added");
        assert_eq!(cart.item_count(), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn adding_past_the_cap_is_rejected() {
        let dish = product(900, 10);
        let id = dish.id;
        let mut catalogue = MockCatalogueRepository::new();
        let found = dish.clone();
        catalogue
            .expect_find_product()
            .return_once(move |_| Ok(Some(found)));
        let mut carts = MockCartRepository::new();
        carts
            .expect_load()
            .return_once(move |_| Ok(Cart::new(vec![cart_line(&dish, 98)])));
        carts.expect_set_quantity().times(0);

        let err = service(carts, catalogue)
            .add_item(&UserId::random(), id, qty(2))
            .await
            .expect_err("over cap");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::unavailable(Some(false))]
    #[tokio::test]
    async fn adding_requires_an_orderable_product(#[case] availability: Option<bool>) {
        let mut catalogue = MockCatalogueRepository::new();
        catalogue.expect_find_product().return_once(move |_| {
            Ok(availability.map(|is_available| {
                let mut dish = product(900, 10);
                dish.is_available = is_available;
                dish
            }))
        });
        let mut carts = MockCartRepository::new();
        carts.expect_set_quantity().times(0);

        let err = service(carts, catalogue)
            .add_item(&UserId::random(), Uuid::new_v4(), qty(1))
            .await
            .expect_err("not orderable");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_quantity_removes_the_line() {
        let mut carts = MockCartRepository::new();
        carts.expect_remove().times(1).return_once(|_, _| Ok(true));
        carts.expect_load().return_once(|_| Ok(Cart::default()));

        let cart = service(carts, MockCatalogueRepository::new())
            .set_quantity(&UserId::random(), Uuid::new_v4(), None)
            .await
            .expect("removed");
        assert!(cart.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn clearing_empties_the_cart() {
        let mut carts = MockCartRepository::new();
        carts.expect_clear().times(1).return_once(|_| Ok(()));

        let cart = service(carts, MockCatalogueRepository::new())
            .clear(&UserId::random())
            .await
            .expect("cleared");
        assert!(cart.is_empty());
    }
}
