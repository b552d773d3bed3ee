//! demo_feed - Write a small catalogue, then read it back declaratively.
//!
//! The writer produces a document with products, each carrying a price and a
//! list of tags. A dispatch tree then extracts the products while ignoring
//! the unrelated `<audit>` section entirely.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example demo_feed
//! ```

use std::cell::RefCell;
use std::io::Cursor;

use kroki_xml::{build_dispatch_tree, read_as_event_stream, xml, Event, EventCursor};

#[derive(Debug, Default)]
struct Product {
    sku: String,
    price: i64,
    tags: Vec<String>,
}

fn main() -> kroki_xml::Result<()> {
    let doc = xml("catalogue", &[("version", "2")], |w| {
        for (sku, price, tags) in [
            ("A-1", 1200, vec!["kitchen", "steel"]),
            ("B-7", 450, vec!["garden"]),
        ] {
            w.tag("product", &[("sku", sku)], |w| {
                w.tag("price", &[], |w| {
                    w.text(price)?;
                    Ok(())
                })?;
                w.tag("tags", &[], |w| {
                    for tag in &tags {
                        w.tag("tag", &[], |w| {
                            w.text(tag)?;
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
                Ok(())
            })?;
        }
        w.tag("audit", &[], |w| {
            w.comment("not interesting")?;
            w.empty_tag("product", &[("sku", "ghost")])?;
            Ok(())
        })?;
        Ok(())
    })?;

    println!("{}\n", doc);

    let products = RefCell::new(Vec::<Product>::new());
    let tree = build_dispatch_tree(|b| {
        b.tag("catalogue", |catalogue| {
            catalogue.use_tag("product", |events| {
                let mut product = Product {
                    sku: events.attribute("sku").unwrap_or_default().to_string(),
                    ..Product::default()
                };
                while events.has_next() {
                    if let Event::StartElement { name, .. } = events.next_event()? {
                        match name.as_str() {
                            "price" => product.price = events.read_int()?,
                            "tag" => product.tags.push(events.read_text()?),
                            _ => {}
                        }
                    }
                }
                products.borrow_mut().push(product);
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })?;

    read_as_event_stream(Cursor::new(doc.as_bytes()), &tree)?;

    println!("{:<6} {:>8}  Tags", "SKU", "Price");
    for product in products.borrow().iter() {
        println!(
            "{:<6} {:>8}  {}",
            product.sku,
            product.price,
            product.tags.join(", ")
        );
    }

    Ok(())
}
