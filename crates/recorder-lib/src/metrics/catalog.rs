//! Fixed PromQL query catalogs
//!
//! Query names double as output column names, so the order here is the
//! column order of the tables and must stay stable.

use crate::models::ResourceKind;

/// A metric name and its query template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub template: &'static str,
}

const fn q(name: &'static str, template: &'static str) -> NamedQuery {
    NamedQuery { name, template }
}

/// Catalog for a resource kind
pub fn catalog(kind: ResourceKind) -> &'static [NamedQuery] {
    match kind {
        ResourceKind::Pod => &POD_QUERIES,
        ResourceKind::Node => &NODE_QUERIES,
        ResourceKind::Deployment => &DEPLOYMENT_QUERIES,
    }
}

pub const POD_QUERIES: [NamedQuery; 26] = [
    // CPU
    q("cpu_usage", r#"((sum(rate(container_cpu_usage_seconds_total{pod="{pod}"}[5m])) or vector(0)) / (sum(kube_pod_container_resource_limits{pod="{pod}", resource="cpu"}) or sum(kube_node_status_allocatable{resource="cpu"}))) * 100"#),
    q("cpu_limit", r#"sum(kube_pod_container_resource_limits{pod="{pod}", resource="cpu"}) or vector(0)"#),
    q("cpu_request", r#"sum(kube_pod_container_resource_requests{pod="{pod}", resource="cpu"}) or vector(0)"#),
    q("cpu_throttling", r#"sum(rate(container_cpu_cfs_throttled_seconds_total{pod="{pod}"}[5m])) OR vector(0)"#),
    // Memory
    q("memory_usage", r#"sum(container_memory_usage_bytes{pod="{pod}"})"#),
    q("memory_limit", r#"sum(kube_pod_container_resource_limits{pod="{pod}", resource="memory"}) or vector(0)"#),
    q("memory_request", r#"sum(kube_pod_container_resource_requests{pod="{pod}", resource="memory"}) or vector(0)"#),
    q("memory_rss", r#"sum(container_memory_rss{pod="{pod}"})"#),
    // Network
    q("network_receive_bytes", r#"sum(rate(container_network_receive_bytes_total{pod="{pod}"}[5m]))"#),
    q("network_transmit_bytes", r#"sum(rate(container_network_transmit_bytes_total{pod="{pod}"}[5m]))"#),
    q("network_errors", r#"sum(rate(container_network_receive_errors_total{pod="{pod}"}[5m]))"#),
    // Status and restarts
    q("restarts", r#"sum(kube_pod_container_status_restarts_total{pod="{pod}"})"#),
    q("oom_killed", r#"sum(kube_pod_container_status_last_terminated_reason{pod="{pod}", reason="OOMKilled"}) or vector(0)"#),
    q("pod_ready", r#"max(kube_pod_status_ready{pod="{pod}"})"#),
    q("pod_phase", r#"kube_pod_status_phase{pod="{pod}"}"#),
    // Disk I/O
    q("disk_read_bytes", r#"sum(rate(container_fs_reads_bytes_total{pod="{pod}"}[5m]))"#),
    q("disk_write_bytes", r#"sum(rate(container_fs_writes_bytes_total{pod="{pod}"}[5m]))"#),
    q("disk_io_errors", r#"sum(rate(container_fs_errors_total{pod="{pod}"}[5m])) or vector(0)"#),
    // Scheduling
    q("pod_scheduled", r#"max(kube_pod_status_scheduled{pod="{pod}"})"#),
    q("pod_pending", r#"max(kube_pod_status_phase{pod="{pod}", phase="Pending"})"#),
    q("pod_unschedulable", r#"max(kube_pod_status_unschedulable{pod="{pod}"}) or vector(0)"#),
    // Container state
    q("container_running", r#"max(kube_pod_container_status_running{pod="{pod}"})"#),
    q("container_terminated", r#"max(kube_pod_container_status_terminated{pod="{pod}"})"#),
    q("container_waiting", r#"max(kube_pod_container_status_waiting{pod="{pod}"})"#),
    // Lifecycle
    q("pod_uptime_seconds", r#"time() - kube_pod_start_time{pod="{pod}"}"#),
    // Ratios
    q("cpu_utilization_ratio", r#"(sum(rate(container_cpu_usage_seconds_total{pod="{pod}"}[5m])) or vector(0))/ (sum(kube_pod_container_resource_limits{pod="{pod}", resource="cpu"}) or vector(1))"#),
];

pub const NODE_QUERIES: [NamedQuery; 31] = [
    // CPU
    q("node_cpu_usage", r#"(sum(rate(node_cpu_seconds_total{mode!="idle", node="{node}"}[5m])) or vector(0)) * 100"#),
    q("node_cpu_capacity", r#"sum(kube_node_status_capacity{node="{node}", resource="cpu"}) or vector(0)"#),
    q("node_cpu_allocatable", r#"sum(kube_node_status_allocatable{node="{node}", resource="cpu"}) or vector(0)"#),
    q("node_cpu_utilization_ratio", r#"sum(rate(node_cpu_seconds_total{node="{node}", mode!="idle"}[5m])) / sum(kube_node_status_allocatable{node="{node}", resource="cpu"})"#),
    // Memory
    q("node_memory_usage", r#"((1 - (sum(node_memory_MemAvailable_bytes{node="{node}"}) or vector(0)) / (sum(node_memory_MemTotal_bytes{node="{node}"}) or vector(1))) * 100)"#),
    q("node_memory_capacity", r#"sum(kube_node_status_capacity{node="{node}", resource="memory"}) or vector(0)"#),
    q("node_memory_allocatable", r#"sum(kube_node_status_allocatable{node="{node}", resource="memory"}) or vector(0)"#),
    q("node_memory_utilization_ratio", r#"1 - (sum(node_memory_MemAvailable_bytes{node="{node}"}) / sum(node_memory_MemTotal_bytes{node="{node}"}))"#),
    // Disk
    q("node_disk_usage", r#"(1 - sum(node_filesystem_avail_bytes{node="{node}"}) / sum(node_filesystem_size_bytes{node="{node}"})) * 100"#),
    q("node_disk_capacity", r#"sum(kube_node_status_capacity{node="{node}", resource="ephemeral-storage"}) or vector(0)"#),
    q("node_disk_allocatable", r#"sum(kube_node_status_allocatable{node="{node}", resource="ephemeral-storage"}) or vector(0)"#),
    q("node_disk_available", r#"sum(node_filesystem_avail_bytes{node="{node}", mountpoint="/"})"#),
    q("node_disk_utilization_ratio", r#"(sum(node_filesystem_size_bytes{node="{node}"}) - sum(node_filesystem_avail_bytes{node="{node}"})) / sum(node_filesystem_size_bytes{node="{node}"})"#),
    q("node_disk_read_bytes", r#"sum(rate(node_disk_read_bytes_total{instance="{node}"}[5m]))"#),
    q("node_disk_write_bytes", r#"sum(rate(node_disk_written_bytes_total{instance="{node}"}[5m]))"#),
    q("node_inode_utilization_ratio", r#"1 - (sum(node_filesystem_files_free{node="{node}", mountpoint="/"}) / sum(node_filesystem_files{node="{node}", mountpoint="/"}))"#),
    // Network
    q("node_network_receive_bytes", r#"sum(rate(node_network_receive_bytes_total{node="{node}"}[5m]))"#),
    q("node_network_transmit_bytes", r#"sum(rate(node_network_transmit_bytes_total{node="{node}"}[5m]))"#),
    q("node_network_errors", r#"sum(rate(node_network_receive_errs_total{node="{node}"}[5m])) or vector(0)"#),
    // Conditions
    q("node_ready", r#"max(kube_node_status_condition{node="{node}", condition="Ready"})"#),
    q("node_memory_pressure", r#"max(kube_node_status_condition{node="{node}", condition="MemoryPressure"})"#),
    q("node_disk_pressure", r#"max(kube_node_status_condition{node="{node}", condition="DiskPressure"})"#),
    q("node_pid_pressure", r#"max(kube_node_status_condition{node="{node}", condition="PIDPressure"})"#),
    q("node_out_of_disk", r#"max(kube_node_status_condition{node="{node}", condition="OutOfDisk", status="true"})"#),
    q("node_unschedulable", r#"max(kube_node_spec_unschedulable{node="{node}"})"#),
    // Pod capacity
    q("node_pods_running", r#"count(kube_pod_info{node="{node}"})"#),
    q("node_pods_allocatable", r#"sum(kube_node_status_allocatable_pods{node="{node}"})"#),
    q("node_pods_usage_ratio", r#"count(kube_pod_info{node="{node}"}) / sum(kube_node_status_allocatable_pods{node="{node}"})"#),
    // Age and hardware
    q("node_age_seconds", r#"time() - kube_node_created{node="{node}"}"#),
    q("node_uptime_seconds", r#"time() - node_boot_time_seconds{node="{node}"}"#),
    q("node_hardware_temperature", r#"max(node_hwmon_temp_celsius{node="{node}"})"#),
];

pub const DEPLOYMENT_QUERIES: [NamedQuery; 42] = [
    // Replicas
    q("deployment_replicas", r#"sum(kube_deployment_spec_replicas{deployment="{deployment}"})"#),
    q("deployment_available_replicas", r#"sum(kube_deployment_status_available_replicas{deployment="{deployment}"})"#),
    q("deployment_unavailable_replicas", r#"sum(kube_deployment_status_replicas_unavailable{deployment="{deployment}"})"#),
    q("deployment_updated_replicas", r#"sum(kube_deployment_status_updated_replicas{deployment="{deployment}"})"#),
    q("deployment_mismatch_replicas", r#"sum(kube_deployment_status_replicas{deployment="{deployment}"}) - sum(kube_deployment_spec_replicas{deployment="{deployment}"})"#),
    // CPU
    q("deployment_cpu_usage", r#"sum(rate(container_cpu_usage_seconds_total{container!="", pod=~"{deployment}-.*"}[5m]))"#),
    q("deployment_cpu_requests", r#"sum(kube_pod_container_resource_requests_cpu_cores{pod=~"{deployment}-.*"})"#),
    q("deployment_cpu_limits", r#"sum(kube_pod_container_resource_limits_cpu_cores{pod=~"{deployment}-.*"})"#),
    q("deployment_cpu_utilization_ratio", r#"sum(rate(container_cpu_usage_seconds_total{container!="", pod=~"{deployment}-.*"}[5m])) / clamp_min(sum(kube_pod_container_resource_limits_cpu_cores{pod=~"{deployment}-.*"}), 1)"#),
    // Memory
    q("deployment_memory_usage", r#"sum(container_memory_usage_bytes{container!="", pod=~"{deployment}-.*"})"#),
    q("deployment_memory_requests", r#"sum(kube_pod_container_resource_requests_memory_bytes{pod=~"{deployment}-.*"})"#),
    q("deployment_memory_limits", r#"sum(kube_pod_container_resource_limits_memory_bytes{pod=~"{deployment}-.*"})"#),
    q("deployment_memory_utilization_ratio", r#"sum(container_memory_usage_bytes{container!="", pod=~"{deployment}-.*"}) / clamp_min(sum(kube_pod_container_resource_limits_memory_bytes{pod=~"{deployment}-.*"}), 1)"#),
    // Pod health
    q("deployment_pod_restarts", r#"sum(increase(kube_pod_container_status_restarts_total{pod=~"{deployment}-.*"}[5m]))"#),
    q("deployment_pod_crashloop_backoff", r#"sum(kube_pod_container_status_waiting_reason{pod=~"{deployment}-.*", reason="CrashLoopBackOff"})"#),
    q("deployment_pod_oom_killed", r#"sum(kube_pod_container_status_terminated_reason{pod=~"{deployment}-.*", reason="OOMKilled"})"#),
    q("deployment_pod_terminated", r#"sum(kube_pod_container_status_terminated_reason{pod=~"{deployment}-.*"})"#),
    q("deployment_pod_pending", r#"sum(kube_pod_status_phase{pod=~"{deployment}-.*", phase="Pending"})"#),
    q("deployment_pod_failed", r#"sum(kube_pod_status_phase{pod=~"{deployment}-.*", phase="Failed"})"#),
    q("deployment_pod_evicted", r#"sum(kube_pod_status_reason{pod=~"{deployment}-.*", reason="Evicted"})"#),
    // Network
    q("deployment_network_receive_bytes", r#"sum(rate(container_network_receive_bytes_total{pod=~"{deployment}-.*"}[5m]))"#),
    q("deployment_network_transmit_bytes", r#"sum(rate(container_network_transmit_bytes_total{pod=~"{deployment}-.*"}[5m]))"#),
    q("deployment_network_errors", r#"sum(rate(container_network_receive_errors_total{pod=~"{deployment}-.*"}[5m]) + rate(container_network_transmit_errors_total{pod=~"{deployment}-.*"}[5m]))"#),
    // Disk I/O
    q("deployment_disk_read_bytes", r#"sum(rate(container_fs_reads_bytes_total{pod=~"{deployment}-.*"}[5m]))"#),
    q("deployment_disk_write_bytes", r#"sum(rate(container_fs_writes_bytes_total{pod=~"{deployment}-.*"}[5m]))"#),
    // Pressure conditions
    q("deployment_memory_pressure", r#"max(kube_node_status_condition{condition="MemoryPressure", status="true", node=~".*"})"#),
    q("deployment_disk_pressure", r#"max(kube_node_status_condition{condition="DiskPressure", status="true", node=~".*"})"#),
    q("deployment_pid_pressure", r#"max(kube_node_status_condition{condition="PIDPressure", status="true", node=~".*"})"#),
    // Scheduling
    q("deployment_unschedulable_pods", r#"sum(kube_pod_status_unschedulable{pod=~"{deployment}-.*"})"#),
    q("deployment_waiting_pods", r#"sum(kube_pod_container_status_waiting{pod=~"{deployment}-.*"})"#),
    q("deployment_backoff_limit_exceeded", r#"sum(kube_job_status_failed{job_name=~"{deployment}-.*"})"#),
    // Age and availability
    q("deployment_age_seconds", r#"max(time() - kube_deployment_created{deployment="{deployment}"})"#),
    q("deployment_unavailable_duration", r#"sum(increase(kube_deployment_status_replicas_unavailable{deployment="{deployment}"}[5m]))"#),
    // Conditions
    q("deployment_progressing", r#"sum(kube_deployment_status_condition{deployment="{deployment}", condition="Progressing", status="true"}) > 0"#),
    q("deployment_available", r#"sum(kube_deployment_status_condition{deployment="{deployment}", condition="Available", status="true"}) > 0"#),
    q("deployment_paused", r#"max(kube_deployment_spec_paused{deployment="{deployment}"})"#),
    // Rollout
    q("deployment_replica_set_mismatch", r#"count(kube_replicaset_status_ready_replicas{replicaset=~"{deployment}-.*"} != on() group_left() kube_deployment_spec_replicas{deployment="{deployment}"})"#),
    q("deployment_rollout_in_progress", r#"max(kube_deployment_status_condition{deployment="{deployment}", condition="Progressing", status="true"})"#),
    // Container errors
    q("deployment_image_pull_error", r#"sum(kube_pod_container_status_waiting_reason{pod=~"{deployment}-.*", reason="ImagePullBackOff"})"#),
    q("deployment_create_container_error", r#"sum(kube_pod_container_status_waiting_reason{pod=~"{deployment}-.*", reason="CreateContainerConfigError"})"#),
    q("deployment_node_not_ready", r#"sum(kube_pod_status_reason{pod=~"{deployment}-.*", reason="NodeNotReady"})"#),
    q("deployment_pod_unscheduled", r#"sum(kube_pod_status_unschedulable{pod=~"{deployment}-.*"})"#),
];
