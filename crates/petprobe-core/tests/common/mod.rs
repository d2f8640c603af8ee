pub mod petstore_server;
