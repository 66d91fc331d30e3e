pub fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !is_blank(v))
}

/// Last path segment of `T`'s type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
	let full = std::any::type_name::<T>();
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}
