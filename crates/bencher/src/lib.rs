//! Raw request fixtures shared by the benchmarks.

#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    raw: &'static str,
}

impl Fixture {
    pub const fn new(name: &'static str, raw: &'static str) -> Self {
        Self { name, raw }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The request exactly as it arrives on the wire.
    pub fn raw(&self) -> &'static str {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

pub static GET_SMALL: Fixture = Fixture::new("get_small", include_str!("../resources/request/get_small.txt"));
pub static GET_LARGE: Fixture = Fixture::new("get_large", include_str!("../resources/request/get_large.txt"));
pub static POST_FORM: Fixture = Fixture::new("post_form", include_str!("../resources/request/post_form.txt"));
pub static POST_JSON: Fixture = Fixture::new("post_json", include_str!("../resources/request/post_json.txt"));

pub fn all() -> [Fixture; 4] {
    [GET_SMALL, GET_LARGE, POST_FORM, POST_JSON]
}
