mod helpers;

mod sweep_test;
