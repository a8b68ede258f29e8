mod core_arithmetic_unit_tests;
