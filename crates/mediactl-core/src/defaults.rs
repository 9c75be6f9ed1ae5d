// ── Default settings template ──
//
// The merge base for every load, and the fallback configuration when the
// server cannot be reached. Mirrors the server's own web-settings defaults;
// keys absent from a server payload are back-filled from here so the host
// always sees the complete key set.

use crate::model::{SettingValue, SettingsMap};

/// Build the default settings template.
pub fn default_template() -> SettingsMap {
    let mut template = SettingsMap::new();
    let mut put = |key: &str, value: SettingValue| {
        template.insert(key.to_string(), value);
    };

    // Application
    put("append_profile_name", false.into());
    put("auto_update", true.into());
    put("language", "en-US".into());
    put("minimized", false.into());
    put("show_splash_screen", true.into());

    // Server
    put("server_name", "MediaServer".into());
    put("server_engine", "0".into());
    put("hostname", "".into());
    put("port", "".into());
    put("ip_filter", "".into());
    put("network_interface", "".into());
    put("external_network", true.into());
    put("maximum_bitrate", 90i64.into());
    put("automatic_maximum_bitrate", true.into());

    // Renderers
    put("renderer_default", "".into());
    put("renderer_force_default", false.into());
    put(
        "selected_renderers",
        vec!["All renderers"].into(),
    );

    // Navigation
    put("atz_limit", 10000i64.into());
    put("enable_archive_browsing", false.into());
    put("generate_thumbnails", true.into());
    put("hide_empty_folders", false.into());
    put("hide_enginenames", true.into());
    put("hide_extensions", true.into());
    put("ignore_the_word_a_and_the", true.into());
    put("prettify_filenames", false.into());
    put("sort_method", "4".into());
    put("fully_played_action", "1".into());
    put("fully_played_output_directory", "".into());

    // Shared content
    put("folders", SettingValue::List(Vec::new()));
    put("folders_monitored", SettingValue::List(Vec::new()));

    // Transcoding
    put("audio_bitrate", "448".into());
    put("audio_channels", "6".into());
    put("audio_embed_dts_in_pcm", false.into());
    put("audio_remux_ac3", true.into());
    put("audio_resample", true.into());
    put("audio_thumbnails_method", "1".into());
    put("audio_use_pcm", false.into());
    put("chapter_interval", 5i64.into());
    put("chapter_support", false.into());
    put("disable_subtitles", false.into());
    put("disable_transcode_for_extensions", "".into());
    put("encoded_audio_passthrough", false.into());
    put("force_transcode_for_extensions", "".into());
    put("gpu_acceleration", false.into());
    put("maximum_video_buffer_size", 200i64.into());

    // Subtitles
    put("autoload_external_subtitles", true.into());
    put("force_external_subtitles", true.into());
    put("forced_subtitle_language", "".into());
    put("forced_subtitle_tags", "forced".into());
    put("subtitles_codepage", "".into());
    put("use_embedded_subtitles_style", true.into());

    template
}
