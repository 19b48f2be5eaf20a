use sketchsync_shared::StrokeId;

fn random_u32() -> u32 {
    (js_sys::Math::random() * (u32::MAX as f64 + 1.0)) as u32
}

pub fn make_stroke_id() -> StrokeId {
    let now = js_sys::Date::now() as u64;
    let high = (now << 16) | u64::from(random_u32() & 0xffff);
    let low = (u64::from(random_u32()) << 32) | u64::from(random_u32());
    StrokeId::new([high, low])
}
