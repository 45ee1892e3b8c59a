//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `migrations/` exactly; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        /// Lowercased, unique.
        #[max_length = 255]
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        #[max_length = 16]
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        #[max_length = 120]
        name -> Varchar,
        #[max_length = 96]
        slug -> Varchar,
        description -> Nullable<Text>,
        image_url -> Nullable<Text>,
    }
}

diesel::table! {
    /// Menu items. Deleting a category with products is refused.
    products (id) {
        id -> Uuid,
        category_id -> Uuid,
        #[max_length = 120]
        name -> Varchar,
        #[max_length = 96]
        slug -> Varchar,
        description -> Nullable<Text>,
        price_cents -> Int8,
        image_url -> Nullable<Text>,
        preparation_minutes -> Int4,
        is_available -> Bool,
        is_featured -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per product in a user's cart.
    cart_items (user_id, product_id) {
        user_id -> Uuid,
        product_id -> Uuid,
        quantity -> Int4,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 16]
        status -> Varchar,
        #[max_length = 16]
        stage -> Varchar,
        #[max_length = 16]
        payment_method -> Varchar,
        #[max_length = 16]
        payment_status -> Varchar,
        #[max_length = 64]
        paypal_order_id -> Nullable<Varchar>,
        subtotal_cents -> Int8,
        delivery_fee_cents -> Int8,
        total_cents -> Int8,
        delivery_address -> Text,
        #[max_length = 40]
        phone -> Varchar,
        notes -> Nullable<Text>,
        estimated_minutes -> Int4,
        created_at -> Timestamptz,
        stage_updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Price and name snapshot taken at checkout.
    order_items (id) {
        id -> Int8,
        order_id -> Uuid,
        product_id -> Nullable<Uuid>,
        #[max_length = 120]
        name -> Varchar,
        unit_price_cents -> Int8,
        quantity -> Int4,
    }
}

diesel::table! {
    testimonials (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        #[max_length = 100]
        author_name -> Varchar,
        content -> Text,
        rating -> Int2,
        is_published -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    subscribers (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    contact_messages (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 150]
        subject -> Varchar,
        message -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    chat_groups (id) {
        id -> Uuid,
        #[max_length = 80]
        name -> Varchar,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// `group_id` is null for the general channel.
    chat_messages (id) {
        id -> Int8,
        group_id -> Nullable<Uuid>,
        sender_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    admin_presence (user_id) {
        user_id -> Uuid,
        is_online -> Bool,
        last_seen_at -> Timestamptz,
    }
}

diesel::table! {
    uploaded_images (id) {
        id -> Uuid,
        #[max_length = 64]
        file_name -> Varchar,
        #[max_length = 32]
        content_type -> Varchar,
        size_bytes -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(products -> categories (category_id));
diesel::joinable!(cart_items -> products (product_id));
diesel::joinable!(cart_items -> users (user_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(chat_messages -> users (sender_id));
diesel::joinable!(admin_presence -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    admin_presence,
    cart_items,
    categories,
    chat_groups,
    chat_messages,
    contact_messages,
    order_items,
    orders,
    products,
    subscribers,
    testimonials,
    uploaded_images,
    users,
);
