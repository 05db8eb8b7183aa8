//! Table definitions.
//!
//! Decimal amounts are stored as TEXT so that prices survive the round trip
//! exactly. The four tables are independent; no foreign keys link cart or
//! order rows to users or products.

/// A table and its indexes.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    /// Table name.
    pub name: &'static str,
    /// `CREATE TABLE IF NOT EXISTS` statement.
    pub create_sql: &'static str,
    /// `CREATE INDEX IF NOT EXISTS` statements.
    pub indexes: &'static [&'static str],
    /// Drop the table before creating it.
    pub reset_on_launch: bool,
}

pub const USERS: TableDef = TableDef {
    name: "users",
    create_sql: r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            subscription_type TEXT NOT NULL,
            subscription_days INTEGER
        )
    ",
    indexes: &[],
    reset_on_launch: false,
};

pub const PRODUCTS: TableDef = TableDef {
    name: "products",
    create_sql: r"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            price TEXT NOT NULL,
            thumbnail TEXT,
            availability_status TEXT,
            brand TEXT,
            category TEXT,
            dimensions TEXT,
            discount_percentage TEXT,
            images TEXT,
            meta TEXT,
            minimum_order_quantity INTEGER,
            rating REAL,
            return_policy TEXT,
            reviews TEXT,
            shipping_information TEXT,
            sku TEXT,
            stock INTEGER,
            tags TEXT,
            warranty_information TEXT,
            weight REAL
        )
    ",
    indexes: &[],
    reset_on_launch: false,
};

pub const CART: TableDef = TableDef {
    name: "cart",
    create_sql: r"
        CREATE TABLE IF NOT EXISTS cart (
            id INTEGER PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            price TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            thumbnail TEXT NOT NULL DEFAULT '',
            photo TEXT NOT NULL DEFAULT '',
            discount TEXT
        )
    ",
    indexes: &[],
    reset_on_launch: false,
};

pub const ORDERS: TableDef = TableDef {
    name: "orders",
    create_sql: r"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL,
            user_name TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            product_name TEXT NOT NULL,
            product_price TEXT NOT NULL,
            total_price TEXT NOT NULL
        )
    ",
    indexes: &["CREATE INDEX IF NOT EXISTS idx_orders_order_id ON orders(order_id)"],
    reset_on_launch: false,
};

/// All tables in creation order. `reset_orders` marks `orders` for a drop
/// before creation.
#[must_use]
pub const fn tables(reset_orders: bool) -> [TableDef; 4] {
    [
        USERS,
        PRODUCTS,
        CART,
        TableDef {
            reset_on_launch: reset_orders,
            ..ORDERS
        },
    ]
}
