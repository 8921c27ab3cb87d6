//! Field allow-lists per dialect and scope.
//!
//! Names outside these lists (and outside the dispatched field kinds) are
//! reported as unsupported. The lists are reproduced as published, including
//! `cap_app`.

/// V1 service fields
pub const V1_SERVICE_FIELDS: &[&str] = &[
    "build",
    "dockerfile",
    "cap_app",
    "cap_drop",
    "command",
    "cgroup_parent",
    "container_name",
    "devices",
    "dns",
    "dns_search",
    "entrypoint",
    "env_file",
    "environment",
    "expose",
    "extends",
    "external_links",
    "extra_hosts",
    "image",
    "labels",
    "links",
    "log_driver",
    "log_opt",
    "net",
    "pid",
    "ports",
    "security_opt",
    "stop_signal",
    "ulimits",
    "volumes",
    "volume_driver",
    "volumes_from",
    "cpu_shares",
    "cpu_quota",
    "cpuset",
    "domainname",
    "hostname",
    "ipc",
    "mac_address",
    "mem_limit",
    "memswap_limit",
    "mem_swappiness",
    "privileged",
    "read_only",
    "restart",
    "shm_size",
    "stdin_open",
    "tty",
    "user",
    "working_dir",
];

/// Fields V2 adds to the V1 service fields
pub const V2_SERVICE_ADDITIONS: &[&str] = &[
    "depends_on",
    "tmpfs",
    "group_add",
    "logging",
    "network_mode",
    "networks",
    "stop_grace_period",
    "oom_score_adj",
];

/// Fields V3 adds to the V2 service fields
pub const V3_SERVICE_ADDITIONS: &[&str] = &[
    "deploy",
    "healthcheck",
    "isolation",
    "secrets",
    "sysctls",
];

/// V2 service fields V3 drops
pub const V3_SERVICE_REMOVALS: &[&str] = &[
    "dockerfile",
    "log_driver",
    "net",
    "volume_driver",
    "cpu_shares",
    "cpu_quota",
    "cpuset",
    "mem_limit",
    "memswap_limit",
    "mem_swappiness",
    "oom_score_adj",
];

/// Network fields (V2, V3)
pub const NETWORK_FIELDS: &[&str] = &["driver", "driver_opts", "external", "ipam", "internal"];

/// Global volume fields (V2, V3)
pub const VOLUME_FIELDS: &[&str] = &["driver", "driver_opts", "external"];

/// V1 service fields as an owned list
#[must_use]
pub fn v1_service_fields() -> Vec<&'static str> {
    V1_SERVICE_FIELDS.to_vec()
}

/// V2 service fields: V1 plus the V2 additions
#[must_use]
pub fn v2_service_fields() -> Vec<&'static str> {
    let mut fields = v1_service_fields();
    fields.extend_from_slice(V2_SERVICE_ADDITIONS);
    fields
}

/// V3 service fields: V2 plus the V3 additions, minus the V3 removals
#[must_use]
pub fn v3_service_fields() -> Vec<&'static str> {
    let mut fields = v2_service_fields();
    fields.extend_from_slice(V3_SERVICE_ADDITIONS);
    fields.retain(|f| !V3_SERVICE_REMOVALS.contains(f));
    fields
}
