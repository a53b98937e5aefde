//! Demonstrates typical use of a `PoolRegistry` for reusable message buffers.

use type_pool::{PoolRegistry, Recyclable};

#[derive(Debug, Default)]
struct Message {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recyclable for Message {
    fn reset_state(&mut self) {
        self.headers.clear();
        self.body.clear();
    }
}

fn main() {
    let registry = PoolRegistry::builder().max_capacity(8).build();

    let mut message = registry.create_recyclable(Message::default);
    message
        .headers
        .push(("content-type".to_string(), "text/plain".to_string()));
    message.body.extend_from_slice(b"hello");
    println!("Built message: {message:?}");

    registry.recycle(message);
    println!(
        "Resident messages after recycling: {}",
        registry.pool_count::<Message>()
    );

    let message = registry.create_recyclable(Message::default);
    println!("Reused message is empty: {}", message.body.is_empty());

    registry
        .set_pool_size(4, Message::default)
        .expect("4 is within the maximum capacity of 8");
    println!(
        "Resident messages after resizing: {}",
        registry.pool_count::<Message>()
    );

    if let Err(e) = registry.set_pool_size(16, Message::default) {
        println!("Resizing beyond the maximum capacity failed: {e}");
    }

    if let Some(stats) = registry.pool_stats::<Message>() {
        println!("Hit rate: {:.2}", stats.hit_rate());
    }

    registry.recycle(message);
    registry.clear_pool::<Message>();
    println!(
        "Resident messages after clearing: {}",
        registry.pool_count::<Message>()
    );
}
