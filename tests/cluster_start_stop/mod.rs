mod cluster_lifecycle_test;
mod restart_test;
