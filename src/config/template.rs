/// Contents written by `devroute --init`.
pub fn init_template() -> &'static str {
	r#"# devroute configuration
#
# Requests whose host is match_host and whose path starts with
# match_path_prefix are sent to target_scheme://target_host:target_port.
# The prefix is trimmed from the path (one leading "/" is kept) and the
# original host is sent in the Host header. First matching rule wins.

[[rules]]
match_host = "staging.api.example.com"
match_path_prefix = "/stg/v1/ubah-izin/"
target_host = "127.0.0.1"
target_port = 5000
target_scheme = "http"
"#
}
