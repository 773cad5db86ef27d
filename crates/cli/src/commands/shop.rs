//! Interactive shopping session.
//!
//! Reads one command per line from stdin. Type `help` for the list.

use std::path::Path;

use bazaar_core::forms::{RegistrationForm, ShippingDetails};
use bazaar_core::{PriceBracket, ProductId, Quantity, SortKey, WishlistChange};
use bazaar_storefront::error::Result;
use bazaar_storefront::services::auth::ProfileUpdate;
use bazaar_storefront::services::{catalog, checkout};
use bazaar_storefront::{AppError, AppState, Store, StoreEvent};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use super::{print_cart, print_error, print_product, print_products};

const HELP: &str = "\
Commands:
  list [category] [price] [sort]   browse products (category may be several words;
                                   price: all, 0-50, 50-100, 100-200, 200+;
                                   sort: featured, price-low, price-high, newest)
  show <id>                        product details
  categories                       list categories
  add <id>                         add one to the cart
  remove <id>                      remove from the cart
  qty <id> <n>                     set a cart quantity
  cart                             show the cart
  wish <id>                        toggle an item on the wishlist
  wishlist                         show the wishlist
  clear-wishlist                   empty the wishlist
  register                         create an account
  login <email>                    sign in
  logout                           sign out
  profile [name] [--photo <file>]  show or edit your profile
  checkout                         place an order
  quit                             leave";

type Input = Lines<BufReader<Stdin>>;

/// `bazaar shop`
pub async fn run(state: &AppState) -> Result<()> {
    let mut store = state.new_store();
    spawn_event_logger(&store);

    if let Err(e) = catalog::load_products(state.catalog(), &mut store, None).await {
        print_error(&AppError::from(e).user_message());
    }
    println!(
        "{} products loaded. Type `help` for commands.",
        store.products().products().len()
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = prompt(&mut input, "> ").await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };
        if matches!(command, "quit" | "exit") {
            break;
        }
        if let Err(e) = dispatch(state, &mut store, &mut input, command, args).await {
            e.report();
            print_error(&e.user_message());
        }
    }

    if store.auth().is_authenticated() {
        state.auth().logout(&mut store).await?;
    }
    Ok(())
}

/// Log every store change at debug level.
fn spawn_event_logger(store: &Store) {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StoreEvent::CartChanged { lines, total } => {
                    tracing::debug!(lines, %total, "Cart changed");
                }
                other => tracing::debug!(event = ?other, "Store changed"),
            }
        }
    });
}

async fn dispatch(
    state: &AppState,
    store: &mut Store,
    input: &mut Input,
    command: &str,
    args: &[&str],
) -> Result<()> {
    match (command, args) {
        ("help", _) => println!("{HELP}"),
        ("list", args) => list(state, store, args).await?,
        ("show", [id]) => {
            let product = catalog::load_product(state.catalog(), store, &product_id(id)).await?;
            print_product(&product);
        }
        ("categories", _) => {
            catalog::load_categories(state.catalog(), store).await?;
            for category in store.categories().categories() {
                println!("{category}");
            }
        }
        ("add", [id]) => {
            let product = find(state, store, id).await?;
            store.add_to_cart(&product);
            println!("Added {} to the cart.", product.title);
        }
        ("remove", [id]) => {
            if store.remove_from_cart(&product_id(id)) {
                println!("Removed.");
            } else {
                println!("That item is not in your cart.");
            }
        }
        ("qty", [id, count]) => {
            let quantity = Quantity::parse(count)
                .map_err(|e| AppError::BadRequest(format!("quantity: {e}")))?;
            if !store.set_quantity(&product_id(id), quantity) {
                println!("That item is not in your cart.");
            }
        }
        ("cart", _) => print_cart(store.cart()),
        ("wish", [id]) => {
            let product = find(state, store, id).await?;
            match store.toggle_wishlist(&product) {
                WishlistChange::Added => println!("Saved {} to your wishlist.", product.title),
                WishlistChange::Removed => println!("Removed {} from your wishlist.", product.title),
            }
        }
        ("wishlist", _) => print_products(store.wishlist().items()),
        ("clear-wishlist", _) => {
            store.clear_wishlist();
            println!("Wishlist cleared.");
        }
        ("register", _) => register(state, store, input).await?,
        ("login", [email]) => {
            let password = prompt_required(input, "Password: ").await?;
            let user = state
                .auth()
                .login(store, email, &SecretString::from(password))
                .await?;
            println!("Welcome back, {}.", user.greeting_name());
        }
        ("logout", _) => {
            state.auth().logout(store).await?;
            println!("Signed out.");
        }
        ("profile", args) => profile(state, store, args).await?,
        ("checkout", _) => place_order(store, input).await?,
        _ => println!("Unknown command. Type `help` for the list."),
    }
    Ok(())
}

fn product_id(s: &str) -> ProductId {
    let Ok(id) = s.parse::<ProductId>();
    id
}

/// A product from the loaded listing, falling back to the catalog.
async fn find(state: &AppState, store: &mut Store, id: &str) -> Result<bazaar_core::Product> {
    let id = product_id(id);
    if let Some(product) = store.products().products().iter().find(|p| p.id == id) {
        return Ok(product.clone());
    }
    Ok(catalog::load_product(state.catalog(), store, &id).await?)
}

async fn list(state: &AppState, store: &mut Store, args: &[&str]) -> Result<()> {
    let (category, bracket, sort) = listing_args(args);
    catalog::load_products(state.catalog(), store, category.as_deref()).await?;
    print_products(&store.listing(bracket, sort));
    Ok(())
}

/// Split `list` arguments into category, price bracket and sort order.
///
/// Words that are not a bracket or sort key form the category, so
/// `list men's clothing 0-50` selects "men's clothing".
fn listing_args(args: &[&str]) -> (Option<String>, PriceBracket, SortKey) {
    let mut category = Vec::new();
    let mut bracket = PriceBracket::All;
    let mut sort = SortKey::Featured;

    for arg in args {
        if let Ok(parsed) = arg.parse::<PriceBracket>() {
            bracket = parsed;
        } else if let Ok(parsed) = arg.parse::<SortKey>() {
            sort = parsed;
        } else {
            category.push(*arg);
        }
    }

    let category = (!category.is_empty()).then(|| category.join(" "));
    (category, bracket, sort)
}

async fn register(state: &AppState, store: &mut Store, input: &mut Input) -> Result<()> {
    let form = RegistrationForm {
        email: prompt_required(input, "Email: ").await?,
        confirm_email: prompt_required(input, "Confirm email: ").await?,
        password: prompt_required(input, "Password: ").await?,
        confirm_password: prompt_required(input, "Confirm password: ").await?,
        first_name: prompt_required(input, "First name: ").await?,
        last_name: prompt_required(input, "Last name: ").await?,
        gender: prompt_required(input, "Gender (optional): ").await?,
        dob: prompt_required(input, "Date of birth, YYYY-MM-DD (optional): ").await?,
    };
    let user = state.auth().register(store, &form).await?;
    println!("Welcome, {}.", user.greeting_name());
    Ok(())
}

async fn profile(state: &AppState, store: &mut Store, args: &[&str]) -> Result<()> {
    let auth = state.auth();
    if args.is_empty() {
        let profile = auth.load_profile(store).await?;
        println!("Email: {}", profile.email);
        if let Some(name) = &profile.display_name {
            println!("Name:  {name}");
        }
        if profile.photo.as_deref().is_some_and(|p| !p.is_empty()) {
            println!("Photo: set");
        }
        return Ok(());
    }

    let (name, photo) = match args {
        [name @ .., "--photo", path] => (name, Some(super::admin::read_photo(Path::new(path)).await?)),
        name => (name, None),
    };
    auth.update_profile(
        store,
        ProfileUpdate {
            display_name: name.join(" "),
            photo,
        },
    )
    .await?;
    println!("Profile updated.");
    Ok(())
}

async fn place_order(store: &Store, input: &mut Input) -> Result<()> {
    if !store.auth().is_authenticated() {
        return Err(checkout::CheckoutError::NotSignedIn.into());
    }
    let shipping = ShippingDetails {
        full_name: prompt_required(input, "Full name: ").await?,
        address: prompt_required(input, "Address: ").await?,
        city: prompt_required(input, "City: ").await?,
        postal_code: prompt_required(input, "Postal code: ").await?,
        country: prompt_required(input, "Country: ").await?,
    };
    let order = checkout::place_order(store, &shipping)?;
    println!(
        "Order {} placed for {} item lines, total {}.",
        order.order_id,
        order.lines.len(),
        bazaar_core::types::price::format_amount(order.total)
    );
    Ok(())
}

/// Print `label` and read one line. `None` at end of input.
async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>> {
    let stdout_error = |e: std::io::Error| AppError::Internal(format!("stdout: {e}"));
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await.map_err(stdout_error)?;
    stdout.flush().await.map_err(stdout_error)?;
    input
        .next_line()
        .await
        .map(|line| line.map(|l| l.trim().to_string()))
        .map_err(|e| AppError::Internal(format!("stdin: {e}")))
}

async fn prompt_required(input: &mut Input, label: &str) -> Result<String> {
    prompt(input, label)
        .await?
        .ok_or_else(|| AppError::BadRequest("input ended".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_args_multi_word_category() {
        let (category, bracket, sort) = listing_args(&["men's", "clothing", "0-50", "price-low"]);
        assert_eq!(category.as_deref(), Some("men's clothing"));
        assert_eq!(bracket, PriceBracket::UpTo50);
        assert_eq!(sort, SortKey::PriceLow);
    }

    #[test]
    fn test_listing_args_defaults() {
        let (category, bracket, sort) = listing_args(&[]);
        assert_eq!(category, None);
        assert_eq!(bracket, PriceBracket::All);
        assert_eq!(sort, SortKey::Featured);
    }
}
