#![allow(missing_docs)]
#![allow(dead_code)]

pub const ORDER: &str = r##"
{
    "id": "ord-1042",
    "status": ["!kw", "order/shipped"],
    "note": "null",
    "customer": {
        "name": "Ada",
        "email": null
    },
    "lines": [
        {"sku": "A-1", "qty": 2, "at": ["#point", [1.5, -2]]},
        {"sku": "B-7", "qty": 1, "at": ["#unknown", [0, 0]]}
    ],
    "flags": []
}
"##;

/// `[tag, [x, y]]` as an application value.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl persistent_json::Extension for Point {
    fn tag(&self) -> &str {
        "#point"
    }

    fn payload(&self) -> persistent_json::Value {
        persistent_json::Value::from_iter([
            persistent_json::Value::from(self.x),
            persistent_json::Value::from(self.y),
        ])
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
