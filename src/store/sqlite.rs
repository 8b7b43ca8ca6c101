use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by the test suites.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        is_creator: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn video_from_row(row: &Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        media_id: row.get(2)?,
        media_url: row.get(3)?,
        title: row.get(4)?,
        thumbnail_url: row.get(5)?,
        price_cents: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn bundle_from_row(row: &Row) -> rusqlite::Result<Bundle> {
    Ok(Bundle {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        name: row.get(2)?,
        video_count: row.get(3)?,
        price_cents: row.get(4)?,
        is_active: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn plan_from_row(row: &Row) -> rusqlite::Result<SubscriptionPlan> {
    Ok(SubscriptionPlan {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        monthly_price_cents: row.get(2)?,
        is_active: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn user_subscription_from_row(row: &Row) -> rusqlite::Result<UserSubscription> {
    let status: String = row.get(3)?;
    Ok(UserSubscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        plan_id: row.get(2)?,
        status: SubscriptionStatus::parse(&status).unwrap_or(SubscriptionStatus::Cancelled),
        current_period_start: parse_datetime(&row.get::<_, String>(4)?),
        current_period_end: parse_datetime(&row.get::<_, String>(5)?),
        payment_ref: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const USER_COLS: &str = "id, email, password_hash, name, is_creator, created_at, updated_at";
const VIDEO_COLS: &str =
    "id, creator_id, media_id, media_url, title, thumbnail_url, price_cents, created_at, updated_at";
const BUNDLE_COLS: &str =
    "id, creator_id, name, video_count, price_cents, is_active, created_at, updated_at";
const PLAN_COLS: &str = "id, creator_id, monthly_price_cents, is_active, created_at, updated_at";
const USER_SUB_COLS: &str = "id, user_id, subscription_id, status, current_period_start, \
     current_period_end, payment_ref, created_at, updated_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, email, password_hash, name, is_creator, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.email,
                    user.password_hash,
                    user.name,
                    user.is_creator,
                    format_datetime(&user.created_at),
                    format_datetime(&user.updated_at),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    Error::Conflict("email already registered".into())
                } else {
                    Error::from(e)
                }
            })?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_user_creator(&self, id: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET is_creator = 1, updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
                token.last_used_at.as_ref().map(format_datetime),
            ],
        )?;
        Ok(())
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Video operations

    fn create_video(&self, video: &Video) -> Result<()> {
        self.conn().execute(
            "INSERT INTO videos (id, creator_id, media_id, media_url, title, thumbnail_url, price_cents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                video.id,
                video.creator_id,
                video.media_id,
                video.media_url,
                video.title,
                video.thumbnail_url,
                video.price_cents,
                format_datetime(&video.created_at),
                format_datetime(&video.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_video(&self, id: &str) -> Result<Option<Video>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {VIDEO_COLS} FROM videos WHERE id = ?1"),
            params![id],
            video_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_videos(&self) -> Result<Vec<Video>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {VIDEO_COLS} FROM videos ORDER BY created_at DESC"))?;

        let rows = stmt.query_map([], video_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_creator_videos(&self, creator_id: &str) -> Result<Vec<Video>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {VIDEO_COLS} FROM videos WHERE creator_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![creator_id], video_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_video(&self, video: &Video) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE videos SET title = ?1, price_cents = ?2, thumbnail_url = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                video.title,
                video.price_cents,
                video.thumbnail_url,
                format_datetime(&Utc::now()),
                video.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_video(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM videos WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_owned_videos(&self, ids: &[String], creator_id: &str) -> Result<i64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = (2..=ids.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT COUNT(DISTINCT id) FROM videos WHERE creator_id = ?1 AND id IN ({placeholders})"
        ))?;

        let params_iter = std::iter::once(creator_id.to_string()).chain(ids.iter().cloned());
        let count: i64 = stmt.query_row(params_from_iter(params_iter), |row| row.get(0))?;
        Ok(count)
    }

    // Bundle operations

    fn create_bundle(&self, bundle: &Bundle) -> Result<()> {
        self.conn().execute(
            "INSERT INTO bundles (id, creator_id, name, video_count, price_cents, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                bundle.id,
                bundle.creator_id,
                bundle.name,
                bundle.video_count,
                bundle.price_cents,
                bundle.is_active,
                format_datetime(&bundle.created_at),
                format_datetime(&bundle.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_bundle(&self, id: &str) -> Result<Option<Bundle>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {BUNDLE_COLS} FROM bundles WHERE id = ?1"),
            params![id],
            bundle_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_creator_bundles(&self, creator_id: &str, active_only: bool) -> Result<Vec<Bundle>> {
        let conn = self.conn();
        let sql = if active_only {
            format!(
                "SELECT {BUNDLE_COLS} FROM bundles
                 WHERE creator_id = ?1 AND is_active = 1 ORDER BY created_at DESC"
            )
        } else {
            format!(
                "SELECT {BUNDLE_COLS} FROM bundles WHERE creator_id = ?1 ORDER BY created_at DESC"
            )
        };
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![creator_id], bundle_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_bundle(&self, bundle: &Bundle) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE bundles SET name = ?1, video_count = ?2, price_cents = ?3, is_active = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                bundle.name,
                bundle.video_count,
                bundle.price_cents,
                bundle.is_active,
                format_datetime(&Utc::now()),
                bundle.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_bundle(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM bundles WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Subscription plan operations

    fn create_plan(&self, plan: &SubscriptionPlan) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO subscriptions (id, creator_id, monthly_price_cents, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    plan.id,
                    plan.creator_id,
                    plan.monthly_price_cents,
                    plan.is_active,
                    format_datetime(&plan.created_at),
                    format_datetime(&plan.updated_at),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    Error::Conflict("subscription plan already exists".into())
                } else {
                    Error::from(e)
                }
            })?;
        Ok(())
    }

    fn get_plan(&self, id: &str) -> Result<Option<SubscriptionPlan>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PLAN_COLS} FROM subscriptions WHERE id = ?1"),
            params![id],
            plan_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_creator_plan(
        &self,
        creator_id: &str,
        active_only: bool,
    ) -> Result<Option<SubscriptionPlan>> {
        let conn = self.conn();
        let sql = if active_only {
            format!("SELECT {PLAN_COLS} FROM subscriptions WHERE creator_id = ?1 AND is_active = 1")
        } else {
            format!("SELECT {PLAN_COLS} FROM subscriptions WHERE creator_id = ?1")
        };
        conn.query_row(&sql, params![creator_id], plan_from_row)
            .optional()
            .map_err(Error::from)
    }

    fn update_plan(&self, plan: &SubscriptionPlan) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE subscriptions SET monthly_price_cents = ?1, is_active = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                plan.monthly_price_cents,
                plan.is_active,
                format_datetime(&Utc::now()),
                plan.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_plan(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // User subscription operations

    fn get_user_subscription(
        &self,
        user_id: &str,
        plan_id: &str,
    ) -> Result<Option<UserSubscription>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {USER_SUB_COLS} FROM user_subscriptions
                 WHERE user_id = ?1 AND subscription_id = ?2"
            ),
            params![user_id, plan_id],
            user_subscription_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_subscription_by_id(&self, id: &str) -> Result<Option<UserSubscription>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_SUB_COLS} FROM user_subscriptions WHERE id = ?1"),
            params![id],
            user_subscription_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_user_subscription(&self, sub: &UserSubscription) -> Result<()> {
        self.conn().execute(
            "INSERT INTO user_subscriptions
             (id, user_id, subscription_id, status, current_period_start, current_period_end, payment_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, subscription_id) DO UPDATE SET
                status = excluded.status,
                current_period_start = excluded.current_period_start,
                current_period_end = excluded.current_period_end,
                payment_ref = excluded.payment_ref,
                updated_at = excluded.updated_at",
            params![
                sub.id,
                sub.user_id,
                sub.plan_id,
                sub.status.as_str(),
                format_datetime(&sub.current_period_start),
                format_datetime(&sub.current_period_end),
                sub.payment_ref,
                format_datetime(&sub.created_at),
                format_datetime(&sub.updated_at),
            ],
        )?;
        Ok(())
    }

    fn cancel_user_subscription(&self, id: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE user_subscriptions SET status = 'cancelled', updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn list_active_subscriptions(&self, user_id: &str) -> Result<Vec<SubscriptionWithPlan>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT us.id, us.user_id, us.subscription_id, us.status, us.current_period_start,
                    us.current_period_end, us.payment_ref, us.created_at, us.updated_at,
                    s.monthly_price_cents, u.id, u.name
             FROM user_subscriptions us
             JOIN subscriptions s ON us.subscription_id = s.id
             JOIN users u ON s.creator_id = u.id
             WHERE us.user_id = ?1 AND us.status = 'active'
             ORDER BY us.created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(SubscriptionWithPlan {
                subscription: user_subscription_from_row(row)?,
                monthly_price_cents: row.get(9)?,
                creator_id: row.get(10)?,
                creator_name: row.get(11)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn has_active_subscription(
        &self,
        user_id: &str,
        creator_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT us.current_period_end
             FROM user_subscriptions us
             JOIN subscriptions s ON us.subscription_id = s.id
             WHERE us.user_id = ?1 AND s.creator_id = ?2 AND us.status = 'active'",
        )?;

        // Period-end comparison happens here rather than in SQL so that the
        // timestamp parsing rules match the rest of the store.
        let rows = stmt.query_map(params![user_id, creator_id], |row| {
            row.get::<_, String>(0)
        })?;
        for period_end in rows {
            if parse_datetime(&period_end?) > now {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // Purchase operations

    fn create_purchase(&self, purchase: &Purchase) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO purchases (id, user_id, video_id, purchase_type, amount_cents, payment_ref, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    purchase.id,
                    purchase.user_id,
                    purchase.video_id,
                    purchase.purchase_type.as_str(),
                    purchase.amount_cents,
                    purchase.payment_ref,
                    format_datetime(&purchase.created_at),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    Error::Conflict("video already purchased".into())
                } else {
                    Error::from(e)
                }
            })?;
        Ok(())
    }

    fn get_purchase_any_type(&self, user_id: &str, video_id: &str) -> Result<Option<Purchase>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, video_id, purchase_type, amount_cents, payment_ref, created_at
             FROM purchases WHERE user_id = ?1 AND video_id = ?2 LIMIT 1",
            params![user_id, video_id],
            purchase_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn has_purchase(
        &self,
        user_id: &str,
        video_id: &str,
        purchase_type: PurchaseType,
    ) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM purchases
             WHERE user_id = ?1 AND video_id = ?2 AND purchase_type = ?3",
            params![user_id, video_id, purchase_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_user_purchases(&self, user_id: &str) -> Result<Vec<PurchaseWithVideo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.user_id, p.video_id, p.purchase_type, p.amount_cents, p.payment_ref,
                    p.created_at, v.title, v.media_url, v.thumbnail_url
             FROM purchases p
             JOIN videos v ON p.video_id = v.id
             WHERE p.user_id = ?1
             ORDER BY p.created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(PurchaseWithVideo {
                purchase: purchase_from_row(row)?,
                title: row.get(7)?,
                media_url: row.get(8)?,
                thumbnail_url: row.get(9)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Bundle purchase operations

    fn create_bundle_purchase(
        &self,
        purchase: &BundlePurchase,
        video_ids: &[String],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO bundle_purchases (id, user_id, bundle_id, amount_cents, payment_ref, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                purchase.id,
                purchase.user_id,
                purchase.bundle_id,
                purchase.amount_cents,
                purchase.payment_ref,
                format_datetime(&purchase.created_at),
            ],
        )?;

        for video_id in video_ids {
            tx.execute(
                "INSERT INTO bundle_purchase_videos (bundle_purchase_id, video_id) VALUES (?1, ?2)",
                params![purchase.id, video_id],
            )?;

            // Per-video entitlement row for uniform access checks. OR IGNORE
            // skips videos already unlocked by an earlier overlapping bundle.
            tx.execute(
                "INSERT OR IGNORE INTO purchases
                 (id, user_id, video_id, purchase_type, amount_cents, payment_ref, created_at)
                 VALUES (?1, ?2, ?3, 'bundle', 0, ?4, ?5)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    purchase.user_id,
                    video_id,
                    format!("bundle_{}", purchase.id),
                    format_datetime(&purchase.created_at),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn has_bundle_access(&self, user_id: &str, video_id: &str) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bundle_purchases bp
             JOIN bundle_purchase_videos bpv ON bp.id = bpv.bundle_purchase_id
             WHERE bp.user_id = ?1 AND bpv.video_id = ?2",
            params![user_id, video_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn purchase_from_row(row: &Row) -> rusqlite::Result<Purchase> {
    let purchase_type: String = row.get(3)?;
    Ok(Purchase {
        id: row.get(0)?,
        user_id: row.get(1)?,
        video_id: row.get(2)?,
        purchase_type: PurchaseType::parse(&purchase_type).unwrap_or(PurchaseType::Individual),
        amount_cents: row.get(4)?,
        payment_ref: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}
