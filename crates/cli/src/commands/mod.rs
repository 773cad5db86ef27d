//! CLI command implementations.

#![allow(clippy::print_stdout, clippy::print_stderr)]

pub mod admin;
pub mod browse;
pub mod shop;

use bazaar_core::types::price::format_amount;
use bazaar_core::{Cart, Product};

/// Print a message to stderr.
pub fn print_error(message: &str) {
    eprintln!("error: {message}");
}

/// One line per product: id, price, title and category.
pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        println!(
            "{:>6}  {:>10}  {}  [{}]",
            product.id.to_string(),
            product.price.display(),
            product.title,
            product.category
        );
    }
}

pub fn print_product(product: &Product) {
    println!("{} (#{})", product.title, product.id);
    println!("Price:    {}", product.price.display());
    if !product.category.is_empty() {
        println!("Category: {}", product.category);
    }
    if !product.image.is_empty() {
        println!("Image:    {}", product.image);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>6}  {} x {:<4} {:>10}  {}",
            item.product_id.to_string(),
            item.price.display(),
            item.quantity.get(),
            format_amount(item.line_total()),
            item.title
        );
    }
    println!(
        "Total: {} ({} items)",
        format_amount(cart.total()),
        cart.quantity_total()
    );
}
