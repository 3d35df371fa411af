mod edge_case_tests;
