//! Menu catalog service: categories and menu items
//!
//! Read paths use the cache read-through; every write invalidates the
//! affected keys. Deletes are soft: categories deactivate and menu items
//! become unavailable, so historical order lines keep their joins.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{Category, MenuItem, MenuItemWithCategory};

use crate::cache::Cache;
use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryService;

const CATALOG_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Menu catalog service
#[derive(Clone)]
pub struct MenuService {
    db: PgPool,
    inventory: InventoryService,
    cache: Arc<dyn Cache>,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a category; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for creating a menu item
#[derive(Debug, Deserialize)]
pub struct CreateMenuItemInput {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub cost: Decimal,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Input for updating a menu item; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMenuItemInput {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub is_available: Option<bool>,
}

/// Filter options for listing menu items
#[derive(Debug, Default, Deserialize)]
pub struct MenuItemFilter {
    pub category_id: Option<Uuid>,
    pub available_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MenuService {
    /// Create a new MenuService instance
    pub fn new(db: PgPool, cache: Arc<dyn Cache>) -> Self {
        let inventory = InventoryService::new(db.clone());
        Self {
            db,
            inventory,
            cache,
        }
    }

    /// Create a category; new categories are active by default
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name must not be empty".to_string(),
            });
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, is_active)
            VALUES ($1, $2, true)
            RETURNING id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::from(e),
        })?;

        self.cache.delete_pattern("categories:*").await;

        Ok(category)
    }

    /// Get a category by id, cache read-through
    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        let cache_key = format!("category:{}", id);

        if let Some(category) = self.cache.get::<Category>(&cache_key).await {
            return Ok(category);
        }

        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, is_active, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        self.cache
            .set(&cache_key, &category, CATALOG_CACHE_TTL)
            .await;

        Ok(category)
    }

    /// List categories, cache read-through keyed by the full filter
    pub async fn list_categories(
        &self,
        active_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<Category>> {
        let pagination = shared::Pagination::clamped(limit, offset);
        let cache_key = format!(
            "categories:active:{}:limit:{}:offset:{}",
            active_only, pagination.limit, pagination.offset
        );

        if let Some(categories) = self.cache.get::<Vec<Category>>(&cache_key).await {
            return Ok(categories);
        }

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE ($1 = false OR is_active = true)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(active_only)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        self.cache
            .set(&cache_key, &categories, CATALOG_CACHE_TTL)
            .await;

        Ok(categories)
    }

    /// Update a category
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        self.cache.delete(&format!("category:{}", id)).await;
        self.cache.delete_pattern("categories:*").await;
        if input.name.is_some() {
            self.cache
                .delete_pattern(&format!("menu_items:category:{}:*", id))
                .await;
        }

        Ok(category)
    }

    /// Deactivate a category
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        self.cache.delete(&format!("category:{}", id)).await;
        self.cache.delete_pattern("categories:*").await;
        self.cache
            .delete_pattern(&format!("menu_items:category:{}:*", id))
            .await;

        Ok(())
    }

    /// Create a menu item and bootstrap its inventory row
    pub async fn create_menu_item(&self, input: CreateMenuItemInput) -> AppResult<MenuItem> {
        Self::validate_item_fields(&input.name, input.price, input.cost)?;

        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(input.category_id)
        .fetch_one(&self.db)
        .await?;

        if !category_exists {
            return Err(AppError::NotFound("Category".to_string()));
        }

        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            INSERT INTO menu_items (category_id, name, description, price, cost, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, name, description, price, cost, is_available,
                      created_at, updated_at
            "#,
        )
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.cost)
        .bind(input.is_available)
        .fetch_one(&self.db)
        .await?;

        // Bootstrap the inventory row; the lifecycle paths would lazily
        // create it anyway, so a failure here only loses eagerness
        if let Err(e) = self.inventory.create_inventory_record(item.id).await {
            tracing::warn!("Failed to create inventory record for {}: {}", item.id, e);
        }

        self.cache.delete_pattern("menu_items:*").await;

        Ok(item)
    }

    /// Get a menu item by id, cache read-through
    pub async fn get_menu_item(&self, id: Uuid) -> AppResult<MenuItem> {
        let cache_key = format!("menu_item:{}", id);

        if let Some(item) = self.cache.get::<MenuItem>(&cache_key).await {
            return Ok(item);
        }

        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, category_id, name, description, price, cost, is_available,
                   created_at, updated_at
            FROM menu_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))?;

        self.cache.set(&cache_key, &item, CATALOG_CACHE_TTL).await;

        Ok(item)
    }

    /// List menu items with their category name, cache read-through
    pub async fn list_menu_items(
        &self,
        filter: MenuItemFilter,
    ) -> AppResult<Vec<MenuItemWithCategory>> {
        let pagination = shared::Pagination::clamped(filter.limit, filter.offset);
        let available_only = filter.available_only.unwrap_or(false);

        let cache_key = match filter.category_id {
            Some(category_id) => format!(
                "menu_items:category:{}:limit:{}:offset:{}",
                category_id, pagination.limit, pagination.offset
            ),
            None => format!(
                "menu_items:available:{}:limit:{}:offset:{}",
                available_only, pagination.limit, pagination.offset
            ),
        };

        if let Some(items) = self.cache.get::<Vec<MenuItemWithCategory>>(&cache_key).await {
            return Ok(items);
        }

        let items = sqlx::query_as::<_, MenuItemWithCategory>(
            r#"
            SELECT m.id, m.category_id, c.name as category_name, m.name, m.description,
                   m.price, m.cost, m.is_available, m.created_at, m.updated_at
            FROM menu_items m
            JOIN categories c ON c.id = m.category_id
            WHERE ($1::uuid IS NULL OR m.category_id = $1)
              AND ($2 = false OR m.is_available = true)
            ORDER BY m.name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.category_id)
        .bind(available_only)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        self.cache.set(&cache_key, &items, CATALOG_CACHE_TTL).await;

        Ok(items)
    }

    /// Update a menu item
    pub async fn update_menu_item(
        &self,
        id: Uuid,
        input: UpdateMenuItemInput,
    ) -> AppResult<MenuItem> {
        let existing = self.fetch_menu_item(id).await?;

        let name = input.name.as_deref().unwrap_or(&existing.name);
        let price = input.price.unwrap_or(existing.price);
        let cost = input.cost.unwrap_or(existing.cost);
        Self::validate_item_fields(name, price, cost)?;

        if let Some(category_id) = input.category_id {
            let category_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
            )
            .bind(category_id)
            .fetch_one(&self.db)
            .await?;
            if !category_exists {
                return Err(AppError::NotFound("Category".to_string()));
            }
        }

        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            UPDATE menu_items
            SET category_id = COALESCE($1, category_id),
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                cost = COALESCE($5, cost),
                is_available = COALESCE($6, is_available),
                updated_at = NOW()
            WHERE id = $7
            RETURNING id, category_id, name, description, price, cost, is_available,
                      created_at, updated_at
            "#,
        )
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.cost)
        .bind(input.is_available)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))?;

        self.cache.delete(&format!("menu_item:{}", id)).await;
        self.cache.delete_pattern("menu_items:*").await;
        // Covers both the old and new category list keys
        self.cache
            .delete_pattern(&format!("menu_items:category:{}:*", existing.category_id))
            .await;
        if let Some(category_id) = input.category_id {
            self.cache
                .delete_pattern(&format!("menu_items:category:{}:*", category_id))
                .await;
        }

        Ok(item)
    }

    /// Make a menu item unavailable
    pub async fn delete_menu_item(&self, id: Uuid) -> AppResult<()> {
        let existing = self.fetch_menu_item(id).await?;

        sqlx::query("UPDATE menu_items SET is_available = false, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        self.cache.delete(&format!("menu_item:{}", id)).await;
        self.cache.delete_pattern("menu_items:*").await;
        self.cache
            .delete_pattern(&format!("menu_items:category:{}:*", existing.category_id))
            .await;

        Ok(())
    }

    async fn fetch_menu_item(&self, id: Uuid) -> AppResult<MenuItem> {
        sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, category_id, name, description, price, cost, is_available,
                   created_at, updated_at
            FROM menu_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))
    }

    fn validate_item_fields(name: &str, price: Decimal, cost: Decimal) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Menu item name must not be empty".to_string(),
            });
        }
        if price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price must not be negative".to_string(),
            });
        }
        if cost < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "cost".to_string(),
                message: "Cost must not be negative".to_string(),
            });
        }
        if cost > price {
            return Err(AppError::Validation {
                field: "cost".to_string(),
                message: "Cost must not exceed price".to_string(),
            });
        }
        Ok(())
    }
}
