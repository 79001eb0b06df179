//! Demo: bin a small fruit dataset by color, then by taste range

use geobin_core::{Criteria, CriteriaElement, Error, Result, Strategy, Value};
use geobin_engine::{BinView, Color, DecoratedBin, HierarchicalBinner};

#[derive(Debug, Clone, PartialEq)]
struct Fruit {
    name: &'static str,
    color: Option<&'static str>,
    taste: f64,
}

fn main() -> Result<()> {
    let accessor = |field: &str, fruit: &Fruit| match field {
        "color" => Ok(fruit.color.map(Value::from)),
        "taste" => Ok(Some(Value::from(fruit.taste))),
        other => Err(Error::UnknownField(other.to_string())),
    };

    let criteria = Criteria::new(vec![
        CriteriaElement::new("color", Strategy::Unique),
        CriteriaElement::new("taste", Strategy::Range { bin_width: 2.0 }),
    ])?;

    let mut binner = HierarchicalBinner::new(criteria, accessor)?;
    binner.add_all(vec![
        Fruit { name: "cherry", color: Some("red"), taste: 1.0 },
        Fruit { name: "apple", color: Some("red"), taste: 5.0 },
        Fruit { name: "strawberry", color: Some("red"), taste: 5.5 },
        Fruit { name: "kiwi", color: Some("green"), taste: 2.0 },
        Fruit { name: "lime", color: Some("green"), taste: 2.5 },
        Fruit { name: "banana", color: Some("yellow"), taste: 9.0 },
        Fruit { name: "mystery", color: None, taste: 4.0 },
    ])?;

    println!("{} records in {} leaf bins", binner.len(), binner.bins().len());
    for bin in binner.bins() {
        let decorated = DecoratedBin::new(bin, Color::rgb(70, 130, 180));
        println!(
            "  {} -> {} member(s), color #{:02x}{:02x}{:02x}",
            decorated.key(),
            decorated.len(),
            decorated.color().r,
            decorated.color().g,
            decorated.color().b,
        );
    }

    Ok(())
}
