use chrono::Utc;

use crate::db_types::OrderId;

/// Generates a fresh order id in the `order_<millis>_<hex>` form the storefront and the
/// payment widget expect. The random suffix keeps ids unique within a millisecond.
pub fn generate_order_id() -> OrderId {
    let millis = Utc::now().timestamp_millis();
    OrderId(format!("order_{millis}_{:08x}", rand::random::<u32>()))
}

/// Derives a customer key for purchasers who are not logged in.
pub fn guest_customer_key() -> String {
    format!("guest-{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_ids_have_the_expected_shape() {
        let id = generate_order_id();
        let parts: Vec<&str> = id.as_str().splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "order");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn order_ids_are_unique() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert_ne!(a, b);
    }

    #[test]
    fn guest_keys_are_prefixed() {
        assert!(guest_customer_key().starts_with("guest-"));
    }
}
