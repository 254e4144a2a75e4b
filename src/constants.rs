pub const BOUNDS_SETTINGS: BoundsSettings = BoundsSettings {
    months_before: 1,
    months_after: 2,
    days_per_month: 30.44,
};

pub const TRACK_SETTINGS: TrackSettings = TrackSettings {
    min_track_height: 720.0,
    px_per_month: 12.0,
    min_gap: 88.0,
    depth_fade: 0.45,
};

pub const HORIZONTAL_SETTINGS: HorizontalSettings = HorizontalSettings {
    min_width_percent: 1.0,
};

pub const MARKER_SETTINGS: MarkerSettings = MarkerSettings {
    update_interval_ms: 60_000,
    high_precision_interval_ms: 1_000,
    midnight_settle_ms: 250,
};

pub const FILE_NAMES: FileNames = FileNames {
    experiences: "experiences.json",
    config: "config.json",
    translations: "translations.json",
};

pub struct BoundsSettings {
    pub months_before: u32,
    pub months_after: u32,
    pub days_per_month: f64,
}

pub struct TrackSettings {
    pub min_track_height: f64,
    pub px_per_month: f64,
    pub min_gap: f64,
    pub depth_fade: f64,
}

pub struct HorizontalSettings {
    pub min_width_percent: f64,
}

pub struct MarkerSettings {
    pub update_interval_ms: u64,
    pub high_precision_interval_ms: u64,
    pub midnight_settle_ms: u64,
}

pub struct FileNames {
    pub experiences: &'static str,
    pub config: &'static str,
    pub translations: &'static str,
}
