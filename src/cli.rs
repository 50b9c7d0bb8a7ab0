//! Command-line front-end.
//!
//! Each invocation boots a [`Storefront`] from persisted state, runs one
//! command and exits; the next invocation picks up where this one left
//! off.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::api::{ApiGateway, Credentials, ImageUpload, Product, ProductForm};
use crate::app::Storefront;
use crate::config::Config;
use crate::forms::{CardDetails, CheckoutForm, OrderSummary, PaymentMethod, SignupForm};
use crate::persist::{FileStorage, MemoryStorage, Storage};
use crate::store::auth::Session;
use crate::store::cart::Cart;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Browse the catalog, manage your cart and sign in to the storefront"
)]
pub struct Cli {
    /// Config file (default: ~/.config/storefront/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the persisted cart and session
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep state in memory only; nothing survives the process
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog
    #[command(subcommand)]
    Products(ProductsCommand),
    /// List product categories
    Categories,
    /// Inspect or edit the cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Sign in with an email or username
    ///
    /// Without `--password`, the password is taken from `STOREFRONT_PASSWORD`
    /// or read from stdin.
    Login {
        identifier: String,
        /// Visible in shell history and process listings
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    ///
    /// Omitted passwords are read like for `login`; the confirmation is
    /// always read from stdin unless `--confirm-password` is given.
    Signup {
        email: String,
        /// Visible in shell history and process listings
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout {
        /// Also clear the cart and every persisted key
        #[arg(long)]
        all: bool,
    },
    /// Show the signed-in account
    Whoami,
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Admin dashboard and product management
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    List,
    Show { id: String },
    Search { query: String },
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Show,
    /// Add one of a product (fetches a fresh snapshot first)
    Add { id: String },
    Remove { id: String },
    /// Set the quantity; zero or below removes the line
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove one of a product
    Dec { id: String },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaymentArg {
    CreditCard,
    Paypal,
    ApplePay,
    GooglePay,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub zip: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long, value_enum, default_value_t = PaymentArg::CreditCard)]
    pub payment: PaymentArg,
    #[arg(long)]
    pub card_number: Option<String>,
    #[arg(long)]
    pub card_name: Option<String>,
    /// MM/YY
    #[arg(long)]
    pub card_expiry: Option<String>,
    #[arg(long)]
    pub card_cvc: Option<String>,
}

impl CheckoutArgs {
    pub fn into_form(self) -> CheckoutForm {
        let payment = match self.payment {
            PaymentArg::CreditCard => PaymentMethod::CreditCard(CardDetails {
                number: self.card_number.unwrap_or_default(),
                name: self.card_name.unwrap_or_default(),
                expiry: self.card_expiry.unwrap_or_default(),
                cvc: self.card_cvc.unwrap_or_default(),
            }),
            PaymentArg::Paypal => PaymentMethod::PayPal,
            PaymentArg::ApplePay => PaymentMethod::ApplePay,
            PaymentArg::GooglePay => PaymentMethod::GooglePay,
        };
        CheckoutForm {
            email: self.email,
            phone: self.phone,
            country: self.country,
            first_name: self.first_name,
            last_name: self.last_name,
            company: self.company,
            address: self.address,
            city: self.city,
            zip_code: self.zip,
            payment,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    Stats,
    Activities,
    Create(ProductArgs),
    Update {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: Decimal,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub stock: Option<u32>,
    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl ProductArgs {
    pub fn into_form(self) -> anyhow::Result<ProductForm> {
        let image = match self.image {
            Some(path) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read image '{}'", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                Some(ImageUpload { file_name, bytes })
            }
            None => None,
        };
        Ok(ProductForm {
            name: self.name,
            price: self.price,
            description: self.description,
            category: self.category,
            stock: self.stock,
            image,
        })
    }
}

/// Resolve configuration and storage, then rehydrate.
pub fn build(cli: &Cli) -> anyhow::Result<Storefront> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
        config.validate()?;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.dir = Some(dir.clone());
    }

    let gateway = ApiGateway::new(&config.api)?;
    let storage: Arc<dyn Storage> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(FileStorage::new(config.storage.resolved_dir()))
    };
    Ok(Storefront::boot(gateway, storage))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let storefront = build(&cli)?;

    match cli.command {
        Command::Products(ProductsCommand::List) => {
            print_products(&storefront.products().await?);
        }
        Command::Products(ProductsCommand::Show { id }) => {
            let product = storefront.product(&id).await?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        Command::Products(ProductsCommand::Search { query }) => {
            print_products(&storefront.search_products(&query).await?);
        }
        Command::Categories => {
            for category in storefront.categories().await? {
                println!("{}\t{}", category.id, category.name);
            }
        }

        Command::Cart(command) => {
            let cart = match command {
                CartCommand::Show => storefront.cart(),
                CartCommand::Add { id } => storefront.add_product_by_id(&id).await?,
                CartCommand::Remove { id } => storefront.remove_from_cart(&id)?,
                CartCommand::Set { id, quantity } => storefront.set_quantity(&id, quantity)?,
                CartCommand::Dec { id } => storefront.decrement(&id)?,
                CartCommand::Clear => storefront.clear_cart()?,
            };
            print!("{}", render_cart(&cart));
        }

        Command::Login {
            identifier,
            password,
        } => {
            let password = secret(
                password,
                Some(PASSWORD_ENV),
                "Password",
                &mut std::io::stdin().lock(),
            )?;
            let user = storefront
                .login(&Credentials::new(identifier, password))
                .await?;
            println!("Signed in as {} ({})", user.name, user.role);
        }
        Command::Signup {
            email,
            password,
            confirm_password,
        } => {
            let mut input = std::io::stdin().lock();
            let password = secret(password, Some(PASSWORD_ENV), "Password", &mut input)?;
            let confirm_password =
                secret(confirm_password, None, "Confirm password", &mut input)?;
            drop(input);
            let form = SignupForm {
                email,
                password,
                confirm_password,
            };
            let user = storefront.register(&form).await?;
            println!("Account created, signed in as {}", user.name);
        }
        Command::Logout { all: false } => {
            storefront.logout()?;
            println!("Signed out");
        }
        Command::Logout { all: true } => {
            storefront.reset()?;
            println!("Signed out and cleared all stored data");
        }
        Command::Whoami => println!("{}", render_session(&storefront.session())),

        Command::Checkout(args) => {
            let order = storefront.checkout(&args.into_form())?;
            print!("{}", render_order(&order));
        }

        Command::Admin(AdminCommand::Stats) => {
            let stats = storefront.dashboard_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Admin(AdminCommand::Activities) => {
            for activity in storefront.recent_activities().await? {
                let when = activity.timestamp.as_deref().unwrap_or("-");
                println!("{}\t{}", when, activity.message);
            }
        }
        Command::Admin(AdminCommand::Create(product)) => {
            let created = storefront.create_product(product.into_form()?).await?;
            println!("Created {} ({})", created.name, created.id);
        }
        Command::Admin(AdminCommand::Update { id, product }) => {
            let updated = storefront.update_product(&id, product.into_form()?).await?;
            println!("Updated {} ({})", updated.name, updated.id);
        }
        Command::Admin(AdminCommand::Delete { id }) => {
            let response = storefront.delete_product(&id).await?;
            if response.message.is_empty() {
                println!("Deleted {}", id);
            } else {
                println!("{}", response.message);
            }
        }
    }

    Ok(())
}

/// Fallback source for passwords not given on the command line.
pub const PASSWORD_ENV: &str = "STOREFRONT_PASSWORD";

/// Resolve a secret from its flag, then `env_key`, then one line of `input`.
fn secret(
    flag: Option<String>,
    env_key: Option<&str>,
    prompt: &str,
    input: &mut dyn BufRead,
) -> anyhow::Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }
    if let Some(value) = env_key
        .and_then(|key| std::env::var(key).ok())
        .filter(|value| !value.is_empty())
    {
        return Ok(value);
    }

    eprint!("{}: ", prompt);
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        anyhow::bail!(
            "{} required: pass it on stdin or set {}",
            prompt,
            PASSWORD_ENV
        );
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
    }
    for product in products {
        println!("{}\t{}\t{:.2}", product.id, product.name, product.price);
    }
}

pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }
    let mut out = String::new();
    for line in cart.lines() {
        out.push_str(&format!(
            "{} x {} [{}] @ {:.2} = {:.2}\n",
            line.quantity,
            line.name,
            line.product_id,
            line.price,
            line.subtotal()
        ));
    }
    out.push_str(&format!(
        "Total: {:.2} ({} items)\n",
        cart.total(),
        cart.item_count()
    ));
    out
}

pub fn render_session(session: &Session) -> String {
    match session.user() {
        Some(user) => match &user.email {
            Some(email) => format!("Signed in as {} <{}> ({})", user.name, email, user.role),
            None => format!("Signed in as {} ({})", user.name, user.role),
        },
        None => "Not signed in".to_string(),
    }
}

fn render_order(order: &OrderSummary) -> String {
    let mut out = format!(
        "Order placed for {} via {}\n",
        order.email, order.payment
    );
    for line in &order.lines {
        out.push_str(&format!("  {} x {} = {:.2}\n", line.quantity, line.name, line.subtotal()));
    }
    out.push_str(&format!("Total: {:.2} ({} items)\n", order.total, order.item_count));
    out
}
