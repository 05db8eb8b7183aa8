//! Catalog browsing commands.
//!
//! ```bash
//! cartwheel catalog list --limit 20
//! cartwheel catalog search phone
//! cartwheel catalog show 12
//! ```

use clap::Subcommand;

use cartwheel_core::ProductId;
use cartwheel_shop::error::AppError;
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::state::AppState;

use super::{money, print_listing, say};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products
    List {
        /// Products to fetch (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Products to skip
        #[arg(short, long, default_value_t = 0)]
        skip: u32,
    },
    /// Search products
    Search {
        /// Free-text query
        query: String,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
}

/// Run a catalog command.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown product, or `Cancelled`.
pub async fn run(state: &AppState, scope: &ScreenScope, action: CatalogAction) -> Result<(), AppError> {
    let catalog = state.catalog();
    match action {
        CatalogAction::List { limit, skip } => {
            let limit = limit.unwrap_or(state.config().catalog.page_size);
            let listing = scope.run(catalog.list(limit, skip)).await?;
            print_listing(&listing);
        }
        CatalogAction::Search { query } => {
            let listing = scope.run(catalog.search(&query)).await?;
            print_listing(&listing);
        }
        CatalogAction::Show { id } => {
            let product = scope
                .run(catalog.product(id))
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

            say(&format!("{} (#{})", product.title, product.id));
            say(&format!("Price: {}", money(product.price)));
            if let Some(pct) = product.discount_percentage {
                say(&format!("Discount: {}%", pct.normalize()));
            }
            if let Some(brand) = &product.brand {
                say(&format!("Brand: {brand}"));
            }
            if let Some(category) = &product.category {
                say(&format!("Category: {category}"));
            }
            if let Some(rating) = product.rating {
                say(&format!("Rating: {rating:.2}"));
            }
            if let Some(stock) = product.stock {
                say(&format!("Stock: {stock}"));
            }
            if !product.description.is_empty() {
                say("");
                say(&product.description);
            }
            for line in [
                &product.shipping_information,
                &product.warranty_information,
                &product.return_policy,
                &product.availability_status,
            ]
            .into_iter()
            .flatten()
            {
                say(line);
            }
            if !product.reviews.is_empty() {
                say("");
                say("Reviews:");
                for review in &product.reviews {
                    say(&format!(
                        "  {}/5 {}: {}",
                        review.rating, review.reviewer_name, review.comment
                    ));
                }
            }
        }
    }
    Ok(())
}
