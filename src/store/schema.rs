pub const SCHEMA: &str = r#"
-- Accounts. Any user can flip to creator; the transition is one-way.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    name TEXT NOT NULL,
    is_creator INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Session tokens issued on register/login
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- short prefix for fast lookup
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

-- Videos reference externally hosted media; price 0 marks a free video
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    creator_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    media_id TEXT NOT NULL,
    media_url TEXT NOT NULL,
    title TEXT NOT NULL,
    thumbnail_url TEXT,
    price_cents INTEGER NOT NULL DEFAULT 0 CHECK (price_cents >= 0),
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- "Pick any N videos from this creator" offers
CREATE TABLE IF NOT EXISTS bundles (
    id TEXT PRIMARY KEY,
    creator_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    video_count INTEGER NOT NULL CHECK (video_count >= 2),
    price_cents INTEGER NOT NULL CHECK (price_cents > 0),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Subscription plans. The unique constraint on creator_id closes the
-- check-then-insert race between concurrent plan creations.
CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    creator_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    monthly_price_cents INTEGER NOT NULL CHECK (monthly_price_cents > 0),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- One row per (user, plan); re-subscribing upserts the same row
CREATE TABLE IF NOT EXISTS user_subscriptions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    subscription_id TEXT NOT NULL REFERENCES subscriptions(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'cancelled')),
    current_period_start TEXT NOT NULL,
    current_period_end TEXT NOT NULL,
    payment_ref TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(user_id, subscription_id)
);

-- Per-video entitlements. A bundle-derived row and an individual row for
-- the same video may coexist; the key includes purchase_type.
CREATE TABLE IF NOT EXISTS purchases (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    video_id TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
    purchase_type TEXT NOT NULL CHECK (purchase_type IN ('individual', 'bundle')),
    amount_cents INTEGER NOT NULL DEFAULT 0,
    payment_ref TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(user_id, video_id, purchase_type)
);

-- Parent record for a bundle checkout
CREATE TABLE IF NOT EXISTS bundle_purchases (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    bundle_id TEXT NOT NULL REFERENCES bundles(id) ON DELETE CASCADE,
    amount_cents INTEGER NOT NULL,
    payment_ref TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Junction rows recording which videos a bundle purchase selected
CREATE TABLE IF NOT EXISTS bundle_purchase_videos (
    bundle_purchase_id TEXT NOT NULL REFERENCES bundle_purchases(id) ON DELETE CASCADE,
    video_id TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
    PRIMARY KEY (bundle_purchase_id, video_id)
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_videos_creator ON videos(creator_id);
CREATE INDEX IF NOT EXISTS idx_bundles_creator ON bundles(creator_id);
CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases(user_id);
CREATE INDEX IF NOT EXISTS idx_purchases_video ON purchases(video_id);
CREATE INDEX IF NOT EXISTS idx_user_subscriptions_user ON user_subscriptions(user_id);
CREATE INDEX IF NOT EXISTS idx_bundle_purchases_user ON bundle_purchases(user_id);
CREATE INDEX IF NOT EXISTS idx_bundle_purchase_videos_video ON bundle_purchase_videos(video_id);
"#;
