use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use commerce_core::{CustomerId, OrderId, ProductId, StoreError, StoreResult};
use commerce_customers::Customer;
use commerce_orders::{CustomerStore, NewOrder, Order, OrderStore, ProductStore};
use commerce_products::{Product, StockUpdate};

/// In-memory keyed store for tests/dev.
///
/// One instance per entity type; the store ports are implemented for the
/// concrete instantiations below.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::database(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::database(operation, "lock poisoned"))
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryStore<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Insert or replace a record.
    pub fn insert(&self, key: K, value: V) -> StoreResult<()> {
        self.write("insert")?.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.read("get")?.get(key).cloned())
    }

    pub fn list(&self) -> StoreResult<Vec<V>> {
        Ok(self.read("list")?.values().cloned().collect())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl InMemoryStore<CustomerId, Customer> {
    pub fn seed(customers: impl IntoIterator<Item = Customer>) -> Self {
        Self {
            inner: RwLock::new(customers.into_iter().map(|c| (c.id_typed(), c)).collect()),
        }
    }
}

impl InMemoryStore<ProductId, Product> {
    pub fn seed(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            inner: RwLock::new(products.into_iter().map(|p| (p.id_typed(), p)).collect()),
        }
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore<CustomerId, Customer> {
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        self.get(&id)
    }
}

#[async_trait]
impl ProductStore for InMemoryStore<ProductId, Product> {
    async fn find_all_by_id(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let map = self.read("find_all_by_id")?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn update_quantity(&self, updates: &[StockUpdate]) -> StoreResult<()> {
        let mut map = self.write("update_quantity")?;

        // Validate the whole batch against copies first so a bad entry changes nothing.
        let mut staged: Vec<Product> = Vec::with_capacity(updates.len());
        for update in updates {
            let mut product = match staged.iter().position(|p| p.id_typed() == update.id) {
                Some(i) => staged.swap_remove(i),
                None => map
                    .get(&update.id)
                    .cloned()
                    .ok_or_else(|| StoreError::not_found("product", update.id))?,
            };
            product
                .apply_stock_update(update)
                .map_err(|e| StoreError::conflict(e.to_string()))?;
            staged.push(product);
        }

        for product in staged {
            map.insert(product.id_typed(), product);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore<OrderId, Order> {
    async fn create(&self, input: NewOrder) -> StoreResult<Order> {
        let order = Order::from_new(OrderId::new(), input, Utc::now());
        self.write("create_order")?
            .insert(order.id_typed(), order.clone());
        Ok(order)
    }
}
